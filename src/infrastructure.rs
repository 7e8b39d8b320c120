// インフラストラクチャ層モジュール
pub mod config;
pub mod logging;
pub mod note_repository;
pub mod payment_gateway;
pub mod tracer;

// 再エクスポート
pub use config::{debug_enabled_from_env, ConfigError, NotesTableConfig, StripeConfig};
pub use logging::init_logging;
pub use note_repository::{DynamoNoteRepository, NoteRepository, RepositoryError};
pub use payment_gateway::{ChargeConfirmation, PaymentError, PaymentGateway, StripePaymentGateway};
pub use tracer::{DebugTracer, NoopTracer, Tracer, TracerError};
