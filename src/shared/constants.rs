/// Number of rows shown in the dashboard's recent-records table
pub const RECENT_REPORTS_LIMIT: usize = 10;

/// Prefix of every protocol number handed out as a submission receipt
pub const PROTOCOL_PREFIX: &str = "PRT";

/// Random hex characters in a protocol number
pub const PROTOCOL_TOKEN_LEN: usize = 12;

/// Default route after login
pub const DEFAULT_ROUTE: &str = "/";

pub const LOGIN_ROUTE: &str = "/login";

// =============================================================================
// CATALOGS
// =============================================================================

/// Organizational units a report can be attributed to. The first entry is the form default.
pub const SECTORS: &[&str] = &[
    "GEOTRAN - 1º Distrito",
    "GEOTRAN - 2º Distrito",
    "GEOTRAN - 3º Distrito",
    "GEOTRAN - 4º Distrito",
    "GEOTRAN - 5º Distrito",
    "GEOTRAN - 6º Distrito",
    "GEOTRAN - Sede",
];

/// Infraction types that can be attached to a report
pub const INFRACTION_CATALOG: &[&str] = &[
    "Estacionamento irregular",
    "Conduzir sem habilitação",
    "Licenciamento vencido",
    "Sem capacete",
    "Sem cinto de segurança",
    "Uso de celular ao volante",
    "Avanço de sinal vermelho",
    "Transitar na contramão",
    "Equipamento obrigatório ausente",
    "Recusa ao teste de alcoolemia",
];

pub fn default_sector() -> &'static str {
    SECTORS[0]
}

pub fn is_known_sector(sector: &str) -> bool {
    SECTORS.contains(&sector)
}

pub fn is_known_infraction(infraction_type: &str) -> bool {
    INFRACTION_CATALOG.contains(&infraction_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sector_is_first_catalog_entry() {
        assert_eq!(default_sector(), "GEOTRAN - 1º Distrito");
        assert!(is_known_sector(default_sector()));
    }

    #[test]
    fn test_catalog_lookups_are_exact() {
        assert!(is_known_infraction("Sem capacete"));
        assert!(!is_known_infraction("sem capacete"));
        assert!(!is_known_sector("GEOTRAN - 9º Distrito"));
    }
}
