// アプリケーション層モジュール
pub mod billing_operation;
pub mod business_operation;
pub mod create_note;
pub mod lambda_entry;
pub mod request_handler;

// 再エクスポート
pub use billing_operation::BillingOperation;
pub use business_operation::BusinessOperation;
pub use create_note::CreateNoteOperation;
pub use lambda_entry::LambdaEntry;
pub use request_handler::RequestHandler;
