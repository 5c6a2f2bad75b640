//! Named wrappers for every remote action.
//!
//! Reads pass their arguments as query parameters (GET); writes pass them as
//! a JSON payload (POST).

pub mod types;

use serde_json::{Value, json};

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::executor::RequestExecutor;
use crate::http::{HttpTransport, Scheduler, TokioScheduler, Transport};

pub use types::{ApiResult, ConnectionStatus, QueryParams};

/// Number of audit log entries requested when the caller gives no limit.
pub const DEFAULT_AUDIT_LOG_LIMIT: u32 = 100;

type ApiResponse = Result<ApiResult, ApiError>;

/// Client for the spreadsheet-backed inventory endpoint.
pub struct SheetsApi<T: Transport = HttpTransport, S: Scheduler = TokioScheduler> {
    executor: RequestExecutor<T, S>,
}

impl SheetsApi {
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        Ok(Self {
            executor: RequestExecutor::new(config)?,
        })
    }
}

impl<T: Transport, S: Scheduler> SheetsApi<T, S> {
    pub fn from_executor(executor: RequestExecutor<T, S>) -> Self {
        Self { executor }
    }

    /// Runs any action by name.
    pub async fn request(
        &self,
        action: &str,
        payload: Option<Value>,
        query: &QueryParams,
    ) -> ApiResponse {
        self.executor.execute(action, payload, query).await
    }

    async fn read(&self, action: &str) -> ApiResponse {
        self.request(action, None, &QueryParams::new()).await
    }

    async fn read_filtered(&self, action: &str, filters: &QueryParams) -> ApiResponse {
        self.request(action, None, filters).await
    }

    async fn write(&self, action: &str, payload: Value) -> ApiResponse {
        self.request(action, Some(payload), &QueryParams::new()).await
    }

    pub async fn test_connection(&self) -> ConnectionStatus {
        self.executor.test_connection().await
    }

    pub async fn initialize(&self) -> ApiResponse {
        self.read("initialize").await
    }

    // Items

    pub async fn get_items(&self) -> ApiResponse {
        self.read("getItems").await
    }

    pub async fn add_item(&self, item: Value) -> ApiResponse {
        self.write("addItem", item).await
    }

    pub async fn import_items(&self, items: Vec<Value>) -> ApiResponse {
        self.write("importItems", json!({ "items": items })).await
    }

    pub async fn get_inventory(&self) -> ApiResponse {
        self.read("getInventory").await
    }

    pub async fn get_users(&self) -> ApiResponse {
        self.read("getUsers").await
    }

    // Bookings

    pub async fn get_bookings(&self, filters: &QueryParams) -> ApiResponse {
        self.read_filtered("getBookings", filters).await
    }

    pub async fn create_booking(&self, booking: Value) -> ApiResponse {
        self.write("createBooking", booking).await
    }

    /// `action` is the status transition requested for the booking,
    /// e.g. "approve" or "reject".
    pub async fn update_booking_status(&self, booking_id: &str, action: &str) -> ApiResponse {
        self.write(
            "updateBookingStatus",
            json!({ "bookingId": booking_id, "action": action }),
        )
        .await
    }

    // Loadings

    pub async fn get_loadings(&self, filters: &QueryParams) -> ApiResponse {
        self.read_filtered("getLoadings", filters).await
    }

    pub async fn create_loading(&self, loading: Value) -> ApiResponse {
        self.write("createLoading", loading).await
    }

    pub async fn generate_delivery_note(&self, load_id: &str) -> ApiResponse {
        self.write("generateDeliveryNote", json!({ "loadId": load_id }))
            .await
    }

    // Transactions

    pub async fn get_transactions(&self, filters: &QueryParams) -> ApiResponse {
        self.read_filtered("getTransactions", filters).await
    }

    pub async fn create_transaction(&self, transaction: Value) -> ApiResponse {
        self.write("createTransaction", transaction).await
    }

    // Dispatch and returns

    pub async fn get_dispatch(&self, filters: &QueryParams) -> ApiResponse {
        self.read_filtered("getDispatch", filters).await
    }

    pub async fn create_dispatch(&self, dispatch: Value) -> ApiResponse {
        self.write("createDispatch", dispatch).await
    }

    pub async fn get_returns(&self, filters: &QueryParams) -> ApiResponse {
        self.read_filtered("getReturns", filters).await
    }

    pub async fn create_return(&self, return_data: Value) -> ApiResponse {
        self.write("createReturn", return_data).await
    }

    // Reports

    pub async fn export_sheet(&self, sheet_name: &str) -> ApiResponse {
        let query = QueryParams::from([("sheetName".to_string(), sheet_name.to_string())]);
        self.read_filtered("exportSheet", &query).await
    }

    /// Reads the audit log, defaulting to the most recent 100 entries.
    pub async fn get_audit_log(&self, limit: Option<u32>) -> ApiResponse {
        let limit = limit.unwrap_or(DEFAULT_AUDIT_LOG_LIMIT);
        let query = QueryParams::from([("limit".to_string(), limit.to_string())]);
        self.read_filtered("getAuditLog", &query).await
    }
}
