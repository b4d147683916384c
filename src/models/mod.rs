pub mod auth;
pub mod city;
pub mod response;

pub use auth::{
    AuthChangeEvent, AuthData, AuthResponse, AuthSession, AuthUser, Credentials, OAuthData,
    OAuthOptions, SessionData, SignUpCredentials, SignUpOptions, UserData,
};
pub use city::City;
pub use response::{Envelope, ErrorInfo};
