// ドメイン層モジュール
pub mod api_event;
pub mod api_response;
pub mod billing;
pub mod handler_error;
pub mod handler_outcome;
pub mod invocation_context;
pub mod note;
pub mod trace_log;

// 再エクスポート
pub use api_event::{ApiEvent, Identity, RequestContext};
pub use api_response::{ApiResponse, STATUS_INTERNAL_ERROR, STATUS_OK};
pub use billing::{
    calculate_cost, BillingRequest, BillingResult, Charge, CHARGE_CURRENCY, CHARGE_DESCRIPTION,
    MAX_STORAGE,
};
pub use handler_error::HandlerError;
pub use handler_outcome::{HandlerOutcome, FALLBACK_ERROR_MESSAGE};
pub use invocation_context::InvocationContext;
pub use note::{Note, NoteDraft};
pub use trace_log::{TraceEntry, TraceRecorder};
