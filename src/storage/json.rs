//! JSON exchange format (camelCase record arrays)

use std::io::Read;

use crate::record::TrialRecord;
use crate::Result;

/// Parse a JSON array of records.
///
/// # Errors
///
/// Returns error if the text is not a JSON array of trial records.
pub fn from_json_str(json: &str) -> Result<Vec<TrialRecord>> {
    Ok(serde_json::from_str(json)?)
}

/// Read a JSON array of records.
///
/// # Errors
///
/// Returns error on read failure or invalid JSON.
pub fn load_json<R: Read>(reader: R) -> Result<Vec<TrialRecord>> {
    Ok(serde_json::from_reader(reader)?)
}

/// Serialize records as a pretty-printed JSON array.
///
/// # Errors
///
/// Returns error if serialization fails.
pub fn to_json_string(records: &[TrialRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ImpactQuartile;

    #[test]
    fn test_parse_exchange_format() {
        let json = r#"[
            {
                "id": "PMID-10000",
                "journalName": "JAMA",
                "isICMJEMember": true,
                "hasTRN": true,
                "trn": "NCT01234567",
                "enrollmentDate": "2016-05-01",
                "registrationDate": "2016-04-20",
                "publicationDate": "2018-06-15",
                "impactFactorQuartile": 1
            },
            {
                "id": "PMID-10001",
                "journalName": "General Medical Journal",
                "isICMJEMember": false,
                "hasTRN": false,
                "publicationDate": "2018-07-02"
            }
        ]"#;

        let records = from_json_str(json).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].trn(), Some("NCT01234567"));
        assert_eq!(records[0].impact_factor_quartile(), Some(ImpactQuartile::Q1));
        assert!(!records[1].has_trn());
        assert_eq!(records[1].registration_date(), None);
    }

    #[test]
    fn test_reader_and_writer_agree() {
        let records = vec![TrialRecord::builder("PMID-1", "BMJ", "2018-06-15")
            .trn("ISRCTN12345678")
            .build()
            .unwrap()];
        let json = to_json_string(&records).unwrap();
        assert_eq!(load_json(json.as_bytes()).unwrap(), records);
    }

    #[test]
    fn test_invalid_quartile_rejected() {
        let json = r#"[{"id":"x","journalName":"J","isICMJEMember":false,"hasTRN":false,
            "publicationDate":"2018-01-01","impactFactorQuartile":9}]"#;
        assert!(from_json_str(json).is_err());
    }
}
