pub mod forward_auth;
