//! Case form input and its conversion to a replacement map.
//!
//! A [`CaseForm`] carries the answers of the complaint form, one field per
//! placeholder of the template. Field names in YAML are the placeholder
//! names (`Bank_Name`, `Txn_date`, ...).

use crate::error::{Error, Result};
use crate::replacements::ReplacementMap;
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::Path;
use tracing::warn;

/// Date format of form input.
const INPUT_DATE_FORMAT: &str = "%Y-%m-%d";
/// Date format written into the letter.
const LETTER_DATE_FORMAT: &str = "%d-%m-%Y";

/// Answers of the fraud complaint form.
///
/// # Examples
///
/// ```rust
/// use complaint_docx::form::CaseForm;
///
/// let yaml = r#"
/// section: "66C IT Act"
/// Date_top: "2024-03-05"
/// Sender_Contact_No: "9800000000"
/// Bank_Name: ABC Bank
/// Debit_freeze: Debit freeze
/// FIR_CSR: FIR
/// No_Year: 12/2024
/// Date_FIR_CSR: "2024-03-01"
/// NCRP_No: "31403240001234"
/// Mr_Mrs_Name: Mr. Rao
/// Type_of_offence: UPI fraud
/// Bank_Name_letter: ABC Bank
/// ACC_No_IFSC: 0001 / ABCB0000001
/// Txn_ID: "T-100"
/// Fraud_amount: "25,000"
/// Txn_date: "2024-02-28"
/// Stment_date_from: "2024-02-01"
/// OutTxn_date: "2024-02-28"
/// IP_from_date: "2024-02-01"
/// IP_end_date: "2024-03-01"
/// "#;
/// let form = CaseForm::from_yaml_str(yaml)?;
/// let map = form.to_replacements()?;
///
/// assert_eq!(map.len(), 20);
/// assert_eq!(map.get("{{Date_top}}"), Some("05-03-2024"));
/// assert_eq!(map.keys().next(), Some("{{section}}"));
/// # Ok::<(), complaint_docx::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CaseForm {
    pub section: String,
    #[serde(rename = "Date_top")]
    pub date_top: String,
    #[serde(rename = "Sender_Contact_No")]
    pub sender_contact_no: String,
    #[serde(rename = "Bank_Name")]
    pub bank_name: String,
    #[serde(rename = "Debit_freeze")]
    pub debit_freeze: String,
    #[serde(rename = "FIR_CSR")]
    pub fir_csr: String,
    #[serde(rename = "No_Year")]
    pub no_year: String,
    #[serde(rename = "Date_FIR_CSR")]
    pub date_fir_csr: String,
    #[serde(rename = "NCRP_No")]
    pub ncrp_no: String,
    #[serde(rename = "Mr_Mrs_Name")]
    pub mr_mrs_name: String,
    #[serde(rename = "Type_of_offence")]
    pub type_of_offence: String,
    #[serde(rename = "Bank_Name_letter")]
    pub bank_name_letter: String,
    #[serde(rename = "ACC_No_IFSC")]
    pub acc_no_ifsc: String,
    #[serde(rename = "Txn_ID")]
    pub txn_id: String,
    #[serde(rename = "Fraud_amount")]
    pub fraud_amount: String,
    #[serde(rename = "Txn_date")]
    pub txn_date: String,
    #[serde(rename = "Stment_date_from")]
    pub stment_date_from: String,
    #[serde(rename = "OutTxn_date")]
    pub out_txn_date: String,
    #[serde(rename = "IP_from_date")]
    pub ip_from_date: String,
    #[serde(rename = "IP_end_date")]
    pub ip_end_date: String,
}

/// A form field: its placeholder name, its answer and whether it is a date.
type Field<'a> = (&'static str, &'a str, bool);

impl CaseForm {
    /// Parse a form from YAML text. Every field is required.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_saphyr::from_str(yaml).map_err(|e| Error::Config(format!("invalid case form: {e}")))
    }

    /// Read a form from a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_yaml_str(&yaml)
    }

    /// Fields in form order.
    fn fields(&self) -> [Field<'_>; 20] {
        [
            ("section", self.section.as_str(), false),
            ("Date_top", self.date_top.as_str(), true),
            ("Sender_Contact_No", self.sender_contact_no.as_str(), false),
            ("Bank_Name", self.bank_name.as_str(), false),
            ("Debit_freeze", self.debit_freeze.as_str(), false),
            ("FIR_CSR", self.fir_csr.as_str(), false),
            ("No_Year", self.no_year.as_str(), false),
            ("Date_FIR_CSR", self.date_fir_csr.as_str(), true),
            ("NCRP_No", self.ncrp_no.as_str(), false),
            ("Mr_Mrs_Name", self.mr_mrs_name.as_str(), false),
            ("Type_of_offence", self.type_of_offence.as_str(), false),
            ("Bank_Name_letter", self.bank_name_letter.as_str(), false),
            ("ACC_No_IFSC", self.acc_no_ifsc.as_str(), false),
            ("Txn_ID", self.txn_id.as_str(), false),
            ("Fraud_amount", self.fraud_amount.as_str(), false),
            ("Txn_date", self.txn_date.as_str(), true),
            ("Stment_date_from", self.stment_date_from.as_str(), true),
            ("OutTxn_date", self.out_txn_date.as_str(), true),
            ("IP_from_date", self.ip_from_date.as_str(), true),
            ("IP_end_date", self.ip_end_date.as_str(), true),
        ]
    }

    /// Build the replacement map, keyed in form order, with date fields
    /// converted to the letter's date format.
    pub fn to_replacements(&self) -> Result<ReplacementMap> {
        let mut map = ReplacementMap::new();
        for (name, value, is_date) in self.fields() {
            let value = if is_date {
                let formatted = format_date(value);
                if formatted == value && !value.is_empty() {
                    warn!(field = name, value, "date is not YYYY-MM-DD, passing it through");
                }
                formatted
            } else {
                value.to_string()
            };
            map.insert_field(name, value)?;
        }
        Ok(map)
    }
}

/// Convert a `YYYY-MM-DD` date to `DD-MM-YYYY`.
///
/// Input that does not parse as a date is returned unchanged.
///
/// ```rust
/// use complaint_docx::form::format_date;
///
/// assert_eq!(format_date("2024-03-05"), "05-03-2024");
/// assert_eq!(format_date("not-a-date"), "not-a-date");
/// ```
pub fn format_date(input: &str) -> String {
    match NaiveDate::parse_from_str(input, INPUT_DATE_FORMAT) {
        Ok(date) => date.format(LETTER_DATE_FORMAT).to_string(),
        Err(_) => input.to_string(),
    }
}
