// Business rules that sit between the HTTP handlers and the repositories.
// Pure validation lives in free functions so it can be tested without a pool.
pub mod accounts;
pub mod cart;
pub mod location;
pub mod orders;
pub mod shops;

pub use accounts::AccountService;
pub use orders::OrderService;
pub use shops::ShopService;

/// Trimmed value, or `None` when absent or blank
pub fn required(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::required;

    #[test]
    fn blank_values_are_missing() {
        assert_eq!(required(None), None);
        assert_eq!(required(Some("   ")), None);
        assert_eq!(required(Some(" Asha ")), Some("Asha"));
    }
}
