// handlers/auth/mod.rs - signup and login for both account kinds
//
// No token or session is issued; a successful login just returns the account.
pub mod owner;
pub mod user;
