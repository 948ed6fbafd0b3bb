//! Company universe for filing collection.

pub mod companies;

pub use companies::{Company, CompanyUniverse};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_universe() {
        let universe = CompanyUniverse::new();
        let companies = universe.companies();
        assert_eq!(companies.len(), 10);
        assert_eq!(companies[0].cik.as_deref(), Some("320193"));
        assert_eq!(companies[9].ticker.as_deref(), Some("BRK-B"));
    }

    #[test]
    fn test_from_companies_falls_back_to_defaults() {
        assert_eq!(CompanyUniverse::from_companies(vec![]).companies().len(), 10);

        let custom = CompanyUniverse::from_companies(vec![Company {
            name: "Nvidia".to_string(),
            cik: None,
            ticker: Some("NVDA".to_string()),
        }]);
        assert_eq!(custom.companies().len(), 1);
        assert_eq!(custom.companies()[0].name, "Nvidia");
    }
}
