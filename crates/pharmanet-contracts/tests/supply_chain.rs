//! End-to-end behavior of the three contracts against the in-memory ledger.

use pharmanet_contracts::{
    Chaincode, ContractError, Medicine, NetworkConfig, NewMedicine, Response,
    STATUS_MANUFACTURED,
};
use pharmanet_core::{sha256_bytes, ContentDigest, MedicineId, MspId, OrderId, Timestamp};
use pharmanet_ledger::{MemoryLedger, MemoryTransaction};

const MANUFACTURER: &str = "Org1MSP";
const DISTRIBUTOR: &str = "Org2MSP";
const RETAILER: &str = "Org3MSP";

fn network() -> (MemoryLedger, Chaincode) {
    let config = NetworkConfig::default();
    let ledger = MemoryLedger::new();
    ledger.define_collection(config.order_collection_config());
    (ledger, Chaincode::new(config))
}

fn tx(ledger: &MemoryLedger, msp: &str) -> MemoryTransaction {
    ledger.begin(MspId::new(msp).unwrap())
}

fn order_tx(ledger: &MemoryLedger, msp: &str, fields: &[(&str, &str)]) -> MemoryTransaction {
    fields
        .iter()
        .fold(tx(ledger, msp), |t, (k, v)| t.with_transient(*k, *v))
}

fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

fn new_medicine(id: &str) -> NewMedicine {
    NewMedicine {
        medicine_id: MedicineId::new(id).unwrap(),
        name: "Paracetamol".into(),
        manufacturer: "Org1".into(),
        mfd: "2026-03-01".into(),
        expiry: "2028-03-01".into(),
        price: "25".into(),
        quantity: "1000".into(),
    }
}

fn create_medicine(ledger: &MemoryLedger, cc: &Chaincode, id: &str) {
    let t = tx(ledger, MANUFACTURER);
    cc.medicine().create_medicine(&t, new_medicine(id)).unwrap();
    t.commit().unwrap();
}

const FULL_ORDER: [(&str, &str); 3] = [
    ("medicineName", "Paracetamol"),
    ("quantity", "300"),
    ("distributor", "Org2"),
];

fn create_order(ledger: &MemoryLedger, cc: &Chaincode, id: &str) {
    let t = order_tx(ledger, DISTRIBUTOR, &FULL_ORDER);
    cc.order().create_order(&t, &OrderId::new(id).unwrap()).unwrap();
    t.commit().unwrap();
}

#[test]
fn med_1_scenario() {
    let (ledger, cc) = network();

    let t = tx(&ledger, MANUFACTURER);
    let msg = cc
        .invoke(
            &t,
            "MedicineContract:CreateMedicine",
            &args(&["MED-1", "Paracetamol", "Org1", "2026-01-01", "2028-01-01", "10", "1000"]),
        )
        .unwrap();
    assert_eq!(msg, Response::Message("Added medicine MED-1".into()));
    t.commit().unwrap();

    let t = tx(&ledger, RETAILER);
    let med = cc.medicine().read_medicine(&t, &MedicineId::new("MED-1").unwrap()).unwrap();
    assert_eq!(med.status, STATUS_MANUFACTURED);
    assert_eq!(med.quantity, "1000");

    let t = tx(&ledger, MANUFACTURER);
    let err = cc.medicine().create_medicine(&t, new_medicine("MED-1")).unwrap_err();
    assert_eq!(err.code(), "ALREADY_EXISTS");

    let t = tx(&ledger, RETAILER);
    let msg = cc
        .invoke(
            &t,
            "PharmacyContract:AssignMedicineToPharmacy",
            &args(&["MED-1", "CityPharmacy", "200"]),
        )
        .unwrap();
    assert_eq!(
        msg.render(),
        "Medicine MED-1 assigned to CityPharmacy with quantity 200"
    );
    t.commit().unwrap();

    let t = tx(&ledger, DISTRIBUTOR);
    let out = cc
        .invoke(&t, "PharmacyContract:ReadPharmacyAssignment", &args(&["MED-1"]))
        .unwrap();
    assert_eq!(
        out,
        Response::Json(serde_json::json!({
            "assetType": "PharmacyAssignment",
            "medicineID": "MED-1",
            "pharmacyName": "CityPharmacy",
            "quantity": "200"
        }))
    );

    // The assignment does not clobber the medicine record.
    let med = cc.medicine().read_medicine(&t, &MedicineId::new("MED-1").unwrap()).unwrap();
    assert_eq!(med.name, "Paracetamol");
}

#[test]
fn non_manufacturer_cannot_create_medicine() {
    let (ledger, cc) = network();
    for msp in [DISTRIBUTOR, RETAILER, "Org9MSP"] {
        let t = tx(&ledger, msp);
        let err = cc.medicine().create_medicine(&t, new_medicine("MED-1")).unwrap_err();
        assert!(matches!(err, ContractError::Authorization { .. }), "{msp}");
        t.commit().unwrap();
    }
    assert_eq!(ledger.height(), 0);
    let t = tx(&ledger, MANUFACTURER);
    assert!(!cc
        .medicine()
        .medicine_exists(&t, &MedicineId::new("MED-1").unwrap())
        .unwrap());
}

#[test]
fn denial_precedes_any_ledger_access() {
    let (ledger, cc) = network();
    ledger.set_offline(true);
    let cases: [(&str, &str, &[&str]); 5] = [
        (
            DISTRIBUTOR,
            "MedicineContract:CreateMedicine",
            &["MED-1", "Paracetamol", "Org1", "2026-01-01", "2028-01-01", "10", "1000"],
        ),
        (RETAILER, "MedicineContract:DeleteMedicine", &["MED-1"]),
        (MANUFACTURER, "OrderContract:CreateOrder", &["ORD-1"]),
        (RETAILER, "OrderContract:DeleteOrder", &["ORD-1"]),
        (
            DISTRIBUTOR,
            "PharmacyContract:AssignMedicineToPharmacy",
            &["MED-1", "City Pharmacy", "50"],
        ),
    ];
    for (msp, function, values) in cases {
        let t = order_tx(&ledger, msp, &FULL_ORDER);
        let err = cc.invoke(&t, function, &args(values)).unwrap_err();
        assert_eq!(err.code(), "AUTHORIZATION_ERROR", "{msp} {function}: {err}");
    }

    // The same calls by a permitted caller do reach the ledger.
    let t = tx(&ledger, MANUFACTURER);
    let err = cc
        .invoke(&t, "MedicineContract:DeleteMedicine", &args(&["MED-1"]))
        .unwrap_err();
    assert_eq!(err.code(), "LEDGER_IO_ERROR");

    ledger.set_offline(false);
    assert_eq!(ledger.height(), 0);
}

#[test]
fn duplicate_create_leaves_record_unchanged() {
    let (ledger, cc) = network();
    create_medicine(&ledger, &cc, "MED-1");
    let before = ledger.height();

    let t = tx(&ledger, MANUFACTURER);
    let mut changed = new_medicine("MED-1");
    changed.quantity = "1".into();
    assert_eq!(
        cc.medicine().create_medicine(&t, changed).unwrap_err().code(),
        "ALREADY_EXISTS"
    );
    t.commit().unwrap();
    assert_eq!(ledger.height(), before);

    let t = tx(&ledger, MANUFACTURER);
    let med = cc.medicine().read_medicine(&t, &MedicineId::new("MED-1").unwrap()).unwrap();
    assert_eq!(med.quantity, "1000");
}

#[test]
fn delete_medicine_rules() {
    let (ledger, cc) = network();
    create_medicine(&ledger, &cc, "MED-1");
    let id = MedicineId::new("MED-1").unwrap();

    let t = tx(&ledger, RETAILER);
    cc.pharmacy()
        .assign_medicine_to_pharmacy(&t, &id, "CityPharmacy", "200")
        .unwrap();
    t.commit().unwrap();

    let t = tx(&ledger, DISTRIBUTOR);
    assert_eq!(cc.medicine().delete_medicine(&t, &id).unwrap_err().code(), "AUTHORIZATION_ERROR");

    let t = tx(&ledger, MANUFACTURER);
    assert_eq!(
        cc.medicine().delete_medicine(&t, &id).unwrap(),
        "Medicine with ID MED-1 has been deleted from the world state."
    );
    t.commit().unwrap();

    let t = tx(&ledger, MANUFACTURER);
    assert_eq!(cc.medicine().delete_medicine(&t, &id).unwrap_err().code(), "NOT_FOUND");
    assert_eq!(cc.medicine().read_medicine(&t, &id).unwrap_err().code(), "NOT_FOUND");
    assert_eq!(
        cc.pharmacy().read_pharmacy_assignment(&t, &id).unwrap_err().code(),
        "NOT_FOUND"
    );
}

#[test]
fn list_medicines_skips_other_records_and_releases_iterator() {
    let (ledger, cc) = network();
    create_medicine(&ledger, &cc, "MED-1");
    create_medicine(&ledger, &cc, "MED-2");

    let t = tx(&ledger, RETAILER);
    cc.pharmacy()
        .assign_medicine_to_pharmacy(&t, &MedicineId::new("MED-1").unwrap(), "CityPharmacy", "5")
        .unwrap();
    t.commit().unwrap();

    let t = tx(&ledger, DISTRIBUTOR);
    let meds: Vec<Medicine> = cc.medicine().get_all_medicines(&t).unwrap();
    let ids: Vec<_> = meds.iter().map(|m| m.medicine_id.as_str()).collect();
    assert_eq!(ids, ["MED-1", "MED-2"]);
    assert_eq!(ledger.open_iterators(), 0);
}

#[test]
fn medicine_history_records_create_and_delete() {
    let (ledger, cc) = network();
    let created = Timestamp::parse("2026-03-01T08:00:00Z").unwrap();
    let retired = Timestamp::parse("2026-06-30T16:45:00Z").unwrap();
    let id = MedicineId::new("MED-1").unwrap();

    let t = tx(&ledger, MANUFACTURER).with_timestamp(created);
    cc.medicine().create_medicine(&t, new_medicine("MED-1")).unwrap();
    let create_tx = t.tx_id().to_string();
    t.commit().unwrap();
    let t = tx(&ledger, MANUFACTURER).with_timestamp(retired);
    cc.medicine().delete_medicine(&t, &id).unwrap();
    t.commit().unwrap();

    let t = tx(&ledger, RETAILER);
    let history = cc.medicine().get_medicine_history(&t, &id).unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].record.as_ref().map(|m| m.name.as_str()), Some("Paracetamol"));
    assert_eq!(history[0].tx_id, create_tx);
    assert_eq!(history[0].timestamp, created);
    assert!(!history[0].is_delete);
    assert_eq!(history[1].timestamp, retired);
    assert!(history[1].is_delete);
    assert!(history[1].record.is_none());
    assert_eq!(ledger.open_iterators(), 0);
}

#[test]
fn order_round_trip_and_commitment() {
    let (ledger, cc) = network();
    create_order(&ledger, &cc, "ORD-1");
    let id = OrderId::new("ORD-1").unwrap();

    for msp in [DISTRIBUTOR, MANUFACTURER] {
        let t = tx(&ledger, msp);
        let order = cc.order().read_order(&t, &id).unwrap();
        assert_eq!(order.medicine_name, "Paracetamol");
        assert_eq!(order.quantity, "300");
        assert_eq!(order.distributor, "Org2");
    }

    // The public log carries the hash of the private write, never the value.
    let block = ledger.blocks().pop().unwrap();
    let hashes: Vec<_> = block.private_writes.iter().filter_map(|w| w.hash.clone()).collect();
    assert_eq!(hashes.len(), 1);
    let t = tx(&ledger, RETAILER);
    assert_eq!(cc.order().get_order_hash(&t, &id).unwrap(), hashes[0]);
    let Response::Json(serde_json::Value::String(hex)) = cc
        .invoke(&t, "OrderContract:GetOrderHash", &args(&["ORD-1"]))
        .unwrap()
    else {
        panic!("GetOrderHash should return a JSON string");
    };
    assert_eq!(ContentDigest::from_hex(&hex).unwrap(), hashes[0]);
    let log = serde_json::to_string(&ledger.blocks()).unwrap();
    assert!(!log.contains("Paracetamol"));
}

#[test]
fn order_requires_every_confidential_field() {
    let (ledger, cc) = network();
    let id = OrderId::new("ORD-1").unwrap();
    for omitted in 0..FULL_ORDER.len() {
        let partial: Vec<_> = FULL_ORDER
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != omitted)
            .map(|(_, f)| *f)
            .collect();
        let t = order_tx(&ledger, DISTRIBUTOR, &partial);
        let err = cc.order().create_order(&t, &id).unwrap_err();
        match err {
            ContractError::MissingConfidentialField { field } => {
                assert_eq!(field, FULL_ORDER[omitted].0)
            }
            other => panic!("expected missing field, got {other}"),
        }
        t.commit().unwrap();
    }
    let t = tx(&ledger, RETAILER);
    assert!(!cc.order().order_exists(&t, &id).unwrap());
    assert_eq!(ledger.height(), 0);
}

#[test]
fn confidential_fields_never_positional() {
    let (ledger, cc) = network();
    let t = tx(&ledger, DISTRIBUTOR);
    let err = cc
        .invoke(&t, "OrderContract:CreateOrder", &args(&["ORD-1", "Paracetamol", "300", "Org2"]))
        .unwrap_err();
    assert_eq!(err.code(), "INVALID_ARGUMENT");
}

#[test]
fn outsider_sees_hash_but_not_order() {
    let (ledger, cc) = network();
    create_order(&ledger, &cc, "ORD-1");
    let id = OrderId::new("ORD-1").unwrap();

    let t = tx(&ledger, RETAILER);
    let err = cc.order().read_order(&t, &id).unwrap_err();
    assert!(matches!(err, ContractError::CollectionAccess { .. }));
    assert!(cc.order().order_exists(&t, &id).unwrap());
    assert!(cc.order().get_order_hash(&t, &id).is_ok());
    assert_eq!(
        cc.order().get_all_orders(&t).unwrap_err().code(),
        "COLLECTION_ACCESS_ERROR"
    );
    assert_eq!(ledger.open_iterators(), 0);
}

#[test]
fn verify_order_against_commitment() {
    let (ledger, cc) = network();
    create_order(&ledger, &cc, "ORD-1");
    let id = OrderId::new("ORD-1").unwrap();

    let t = order_tx(&ledger, RETAILER, &FULL_ORDER);
    assert!(cc.order().verify_order(&t, &id).unwrap());

    let tampered = [
        ("medicineName", "Paracetamol"),
        ("quantity", "3000"),
        ("distributor", "Org2"),
    ];
    let t = order_tx(&ledger, RETAILER, &tampered);
    assert!(!cc.order().verify_order(&t, &id).unwrap());

    let t = order_tx(&ledger, RETAILER, &FULL_ORDER);
    let missing = OrderId::new("ORD-404").unwrap();
    assert_eq!(cc.order().verify_order(&t, &missing).unwrap_err().code(), "NOT_FOUND");
}

#[test]
fn order_create_and_delete_rules() {
    let (ledger, cc) = network();
    let id = OrderId::new("ORD-1").unwrap();

    let t = order_tx(&ledger, MANUFACTURER, &FULL_ORDER);
    assert_eq!(cc.order().create_order(&t, &id).unwrap_err().code(), "AUTHORIZATION_ERROR");

    create_order(&ledger, &cc, "ORD-1");
    let t = order_tx(&ledger, DISTRIBUTOR, &FULL_ORDER);
    assert_eq!(cc.order().create_order(&t, &id).unwrap_err().code(), "ALREADY_EXISTS");

    let t = tx(&ledger, RETAILER);
    assert_eq!(cc.order().delete_order(&t, &id).unwrap_err().code(), "AUTHORIZATION_ERROR");

    let t = tx(&ledger, MANUFACTURER);
    cc.order().delete_order(&t, &id).unwrap();
    t.commit().unwrap();

    let t = tx(&ledger, DISTRIBUTOR);
    assert_eq!(cc.order().delete_order(&t, &id).unwrap_err().code(), "NOT_FOUND");
    assert_eq!(cc.order().read_order(&t, &id).unwrap_err().code(), "NOT_FOUND");
}

#[test]
fn orders_by_range_and_listing() {
    let (ledger, cc) = network();
    for id in ["ORD-1", "ORD-2", "ORD-3"] {
        create_order(&ledger, &cc, id);
    }
    let t = tx(&ledger, MANUFACTURER);
    let all = cc.order().get_all_orders(&t).unwrap();
    assert_eq!(all.len(), 3);
    let some = cc.order().get_orders_by_range(&t, "ORD-1", "ORD-3").unwrap();
    let ids: Vec<_> = some.iter().map(|o| o.order_id.as_str()).collect();
    assert_eq!(ids, ["ORD-1", "ORD-2"]);
    assert_eq!(ledger.open_iterators(), 0);
}

#[test]
fn assignment_requires_existing_medicine() {
    let (ledger, cc) = network();
    let id = MedicineId::new("MED-404").unwrap();
    let t = tx(&ledger, RETAILER);
    assert_eq!(
        cc.pharmacy()
            .assign_medicine_to_pharmacy(&t, &id, "CityPharmacy", "1")
            .unwrap_err()
            .code(),
        "NOT_FOUND"
    );

    create_medicine(&ledger, &cc, "MED-1");
    let id = MedicineId::new("MED-1").unwrap();
    let t = tx(&ledger, MANUFACTURER);
    assert_eq!(
        cc.pharmacy()
            .assign_medicine_to_pharmacy(&t, &id, "CityPharmacy", "1")
            .unwrap_err()
            .code(),
        "AUTHORIZATION_ERROR"
    );
    assert_eq!(
        cc.pharmacy().read_pharmacy_assignment(&t, &id).unwrap_err().code(),
        "NOT_FOUND"
    );
}

#[test]
fn second_assignment_overwrites_first() {
    let (ledger, cc) = network();
    create_medicine(&ledger, &cc, "MED-1");
    let id = MedicineId::new("MED-1").unwrap();
    for (pharmacy, qty) in [("CityPharmacy", "200"), ("TownPharmacy", "50")] {
        let t = tx(&ledger, RETAILER);
        cc.pharmacy().assign_medicine_to_pharmacy(&t, &id, pharmacy, qty).unwrap();
        t.commit().unwrap();
    }
    let t = tx(&ledger, MANUFACTURER);
    let a = cc.pharmacy().read_pharmacy_assignment(&t, &id).unwrap();
    assert_eq!((a.pharmacy_name.as_str(), a.quantity.as_str()), ("TownPharmacy", "50"));
}

#[test]
fn anonymous_caller_is_identity_error() {
    let (ledger, cc) = network();
    let t = ledger.begin_anonymous();
    let err = cc.invoke(&t, "MedicineContract:GetAllMedicines", &[]).unwrap_err();
    assert_eq!(err.code(), "IDENTITY_ERROR");
}

#[test]
fn ledger_outage_is_io_error_and_releases_nothing() {
    let (ledger, cc) = network();
    create_medicine(&ledger, &cc, "MED-1");
    let t = tx(&ledger, RETAILER);
    ledger.set_offline(true);
    let err = cc.medicine().get_all_medicines(&t).unwrap_err();
    assert_eq!(err.code(), "LEDGER_IO_ERROR");
    let err = cc
        .medicine()
        .read_medicine(&t, &MedicineId::new("MED-1").unwrap())
        .unwrap_err();
    assert_eq!(err.code(), "LEDGER_IO_ERROR");
    ledger.set_offline(false);
    assert_eq!(ledger.open_iterators(), 0);
}

#[test]
fn concurrent_creates_conflict_at_commit() {
    let (ledger, cc) = network();
    let first = tx(&ledger, MANUFACTURER);
    let second = tx(&ledger, MANUFACTURER);
    cc.medicine().create_medicine(&first, new_medicine("MED-1")).unwrap();
    cc.medicine().create_medicine(&second, new_medicine("MED-1")).unwrap();
    first.commit().unwrap();
    assert!(second.commit().is_err());
    assert_eq!(ledger.height(), 1);
}

#[test]
fn invocations_from_many_threads() {
    let (ledger, cc) = network();
    std::thread::scope(|s| {
        for i in 0..8 {
            let ledger = &ledger;
            let cc = &cc;
            s.spawn(move || {
                let t = tx(ledger, MANUFACTURER);
                cc.medicine()
                    .create_medicine(&t, new_medicine(&format!("MED-{i}")))
                    .unwrap();
                t.commit().unwrap();
            });
        }
    });
    let t = tx(&ledger, RETAILER);
    assert_eq!(cc.medicine().get_all_medicines(&t).unwrap().len(), 8);
}

#[test]
fn commitment_is_hash_of_canonical_record() {
    let (ledger, cc) = network();
    create_order(&ledger, &cc, "ORD-9");
    let t = tx(&ledger, DISTRIBUTOR);
    let id = OrderId::new("ORD-9").unwrap();
    let order = cc.order().read_order(&t, &id).unwrap();
    let expected = sha256_bytes(serde_jcs::to_string(&order).unwrap().as_bytes());
    assert_eq!(cc.order().get_order_hash(&t, &id).unwrap(), expected);
}
