//! Macro for implementing Display and FromStr for status enums
//!
//! Lead stages, claim outcomes and strategy names all travel as lowercase
//! strings (CLI arguments, SQLite columns, JSON). One macro keeps the mapping
//! in a single place per enum.
//!
//! # Example
//!
//! ```rust
//! use leadflow_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum PoolState {
//!     Open,
//!     Frozen,
//! }
//!
//! impl_domain_status_conversions!(PoolState {
//!     Open => "open",
//!     Frozen => "frozen",
//! });
//!
//! assert_eq!(PoolState::Frozen.to_string(), "frozen");
//! assert_eq!("OPEN".parse::<PoolState>(), Ok(PoolState::Open));
//! ```

/// Implements Display and FromStr traits for status enums
///
/// - Display writes the mapped string
/// - FromStr parses case-insensitively and names the enum in its error
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
