pub mod authentication;
pub mod registration;
pub mod resolver;

pub use authentication::{AuthenticationOutcome, Authenticator};
pub use registration::Registrar;
pub use resolver::{BestMatchResolver, Resolution, MATCH_THRESHOLD, MAX_MATCHES};
