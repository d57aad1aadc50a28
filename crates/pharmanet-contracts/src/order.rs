//! # Order Contract
//!
//! Distributor orders are confidential. The order id is the only positional
//! argument; medicine name, quantity, and distributor travel in the
//! transient map and are written only to the order collection, whose
//! members are the manufacturer and the distributor. Every other
//! organization sees the commitment hash the ledger publishes, and can use
//! [`OrderContract::verify_order`] to check a payload shown to it off-chain
//! against that hash.

use std::collections::BTreeMap;

use pharmanet_core::{sha256_digest, AssetType, ContentDigest, OrderId};
use pharmanet_ledger::TransactionContext;

use crate::collection::{read_confidential_fields, ConfidentialCollection};
use crate::config::NetworkConfig;
use crate::error::ContractError;
use crate::identity::resolve_caller;
use crate::model::Order;
use crate::policy::{authorize, Operation};
use crate::projection::project_records;
use crate::record::LedgerRecord;

#[derive(Debug, Clone)]
pub struct OrderContract {
    config: NetworkConfig,
}

impl OrderContract {
    pub fn new(config: NetworkConfig) -> Self {
        Self { config }
    }

    fn collection<'a>(&'a self, ctx: &'a dyn TransactionContext) -> ConfidentialCollection<'a> {
        ConfidentialCollection::new(ctx.stub(), &self.config.order_collection)
    }

    /// Place an order from transient fields. Distributor only.
    pub fn create_order(
        &self,
        ctx: &dyn TransactionContext,
        order_id: &OrderId,
    ) -> Result<String, ContractError> {
        let caller = resolve_caller(ctx, &self.config)?;
        authorize(Operation::CreateOrder, &caller)?;

        let orders = self.collection(ctx);
        if orders.exists(order_id.as_str())? {
            return Err(ContractError::AlreadyExists {
                kind: Order::KIND,
                id: order_id.to_string(),
            });
        }
        let fields = read_confidential_fields(ctx.stub(), &Order::CONFIDENTIAL_FIELDS)?;
        let order = order_from_fields(order_id, fields);
        let digest = orders.commit(order_id.as_str(), &order)?;
        tracing::info!(order_id = %order_id, digest = %digest, "order committed");
        Ok(format!("Order {order_id} created successfully"))
    }

    /// Read an order. Non-members of the collection get a collection
    /// access error from the ledger.
    pub fn read_order(
        &self,
        ctx: &dyn TransactionContext,
        order_id: &OrderId,
    ) -> Result<Order, ContractError> {
        let caller = resolve_caller(ctx, &self.config)?;
        authorize(Operation::ReadOrder, &caller)?;

        let orders = self.collection(ctx);
        require_order(&orders, order_id)?;
        orders.get(order_id.as_str())
    }

    /// Remove an order. Distributor or manufacturer.
    pub fn delete_order(
        &self,
        ctx: &dyn TransactionContext,
        order_id: &OrderId,
    ) -> Result<String, ContractError> {
        let caller = resolve_caller(ctx, &self.config)?;
        authorize(Operation::DeleteOrder, &caller)?;

        let orders = self.collection(ctx);
        require_order(&orders, order_id)?;
        orders.delete(order_id.as_str())?;
        tracing::info!(order_id = %order_id, "order deleted");
        Ok(format!("Order {order_id} deleted successfully"))
    }

    pub fn get_all_orders(&self, ctx: &dyn TransactionContext) -> Result<Vec<Order>, ContractError> {
        let caller = resolve_caller(ctx, &self.config)?;
        authorize(Operation::ListOrders, &caller)?;
        let results = self.collection(ctx).rich_query(&Order::ASSET_TYPE.selector())?;
        project_records(results)
    }

    /// Orders with ids in `[start, end)`; empty bounds are open.
    pub fn get_orders_by_range(
        &self,
        ctx: &dyn TransactionContext,
        start: &str,
        end: &str,
    ) -> Result<Vec<Order>, ContractError> {
        let caller = resolve_caller(ctx, &self.config)?;
        authorize(Operation::ListOrders, &caller)?;
        let results = self.collection(ctx).range_query(start, end)?;
        project_records(results)
    }

    /// Whether an order is committed. Discloses existence, not content.
    pub fn order_exists(
        &self,
        ctx: &dyn TransactionContext,
        order_id: &OrderId,
    ) -> Result<bool, ContractError> {
        let caller = resolve_caller(ctx, &self.config)?;
        authorize(Operation::OrderExists, &caller)?;
        self.collection(ctx).exists(order_id.as_str())
    }

    /// The public commitment hash of an order.
    pub fn get_order_hash(
        &self,
        ctx: &dyn TransactionContext,
        order_id: &OrderId,
    ) -> Result<ContentDigest, ContractError> {
        let caller = resolve_caller(ctx, &self.config)?;
        authorize(Operation::OrderHash, &caller)?;
        self.collection(ctx)
            .hash(order_id.as_str())?
            .ok_or_else(|| not_found(order_id))
    }

    /// Check transient fields against the committed hash of an order.
    pub fn verify_order(
        &self,
        ctx: &dyn TransactionContext,
        order_id: &OrderId,
    ) -> Result<bool, ContractError> {
        let caller = resolve_caller(ctx, &self.config)?;
        authorize(Operation::VerifyOrder, &caller)?;

        let committed = self
            .collection(ctx)
            .hash(order_id.as_str())?
            .ok_or_else(|| not_found(order_id))?;
        let fields = read_confidential_fields(ctx.stub(), &Order::CONFIDENTIAL_FIELDS)?;
        let candidate = order_from_fields(order_id, fields).encode()?;
        let matches = sha256_digest(&candidate) == committed;
        tracing::debug!(order_id = %order_id, matches, "order verified");
        Ok(matches)
    }
}

fn not_found(order_id: &OrderId) -> ContractError {
    ContractError::NotFound {
        kind: Order::KIND,
        id: order_id.to_string(),
    }
}

fn require_order(
    orders: &ConfidentialCollection<'_>,
    order_id: &OrderId,
) -> Result<(), ContractError> {
    if orders.exists(order_id.as_str())? {
        Ok(())
    } else {
        Err(not_found(order_id))
    }
}

fn order_from_fields(order_id: &OrderId, mut fields: BTreeMap<&'static str, String>) -> Order {
    let mut take = |name: &str| fields.remove(name).unwrap_or_default();
    Order {
        asset_type: AssetType::Order,
        order_id: order_id.clone(),
        medicine_name: take("medicineName"),
        quantity: take("quantity"),
        distributor: take("distributor"),
    }
}
