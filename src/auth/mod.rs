// Credential gate: bearer tokens for the completion service.
//
// The gate owns the only cross-call mutable state in the crate (the cached
// credential). The exchange and the clock are traits so the renewal rules can
// be exercised without a network or a real clock.

pub mod exchange;
pub mod gate;

pub use exchange::ClientCredentialsExchange;
pub use gate::{Clock, Credential, CredentialGate, SystemClock, TokenGrant, TokenSource};
