//! Per-placeholder character styles.
//!
//! Each placeholder of the complaint template has a fixed look in the filled
//! letter. The table below maps a placeholder token to its [`StyleRule`];
//! tokens without an entry get no explicit style.
//!
//! # Examples
//!
//! ```rust
//! use complaint_docx::docx::Run;
//! use complaint_docx::style::{apply_style, rule_for};
//!
//! let rule = rule_for("{{Bank_Name}}").unwrap();
//! let mut run = Run::new("ABC Bank");
//! apply_style(&mut run, rule);
//!
//! assert_eq!(run.format().font.as_deref(), Some("Tahoma"));
//! assert_eq!(run.format().size_points(), Some(12.0));
//! assert_eq!(run.format().bold, Some(true));
//! assert_eq!(run.format().underline, Some(false));
//! ```
use crate::docx::{Paragraph, Run};
use crate::error::{Error, Result};
use phf::phf_map;

/// Font family every placeholder of the template is rendered in.
pub const TEMPLATE_FONT: &str = "Tahoma";

/// A complete character style: font family, point size, bold, underline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleRule {
    pub font: &'static str,
    pub size_pt: u32,
    pub bold: bool,
    pub underline: bool,
}

impl StyleRule {
    pub const fn new(font: &'static str, size_pt: u32, bold: bool, underline: bool) -> Self {
        Self {
            font,
            size_pt,
            bold,
            underline,
        }
    }

    /// Size in half-points, the unit `w:sz` is stored in.
    #[inline]
    pub const fn size_half_points(&self) -> u32 {
        self.size_pt * 2
    }
}

const HEADING: StyleRule = StyleRule::new(TEMPLATE_FONT, 12, true, true);
const CONTACT: StyleRule = StyleRule::new(TEMPLATE_FONT, 11, true, false);
const EMPHASIS: StyleRule = StyleRule::new(TEMPLATE_FONT, 12, true, false);
const BODY: StyleRule = StyleRule::new(TEMPLATE_FONT, 12, false, false);
const LETTER_DETAIL: StyleRule = StyleRule::new(TEMPLATE_FONT, 11, false, false);

/// Style of the data cells of the summary table.
pub const SUMMARY_CELL: StyleRule = LETTER_DETAIL;

/// Placeholder token to style.
static STYLE_RULES: phf::Map<&'static str, StyleRule> = phf_map! {
    "{{section}}" => HEADING,
    "{{Date_top}}" => HEADING,

    "{{Sender_Contact_No}}" => CONTACT,

    "{{Bank_Name}}" => EMPHASIS,
    "{{Debit_freeze}}" => EMPHASIS,

    "{{FIR_CSR}}" => BODY,
    "{{No_Year}}" => BODY,
    "{{Date_FIR_CSR}}" => BODY,
    "{{NCRP_No}}" => BODY,
    "{{Mr_Mrs_Name}}" => BODY,
    "{{Type_of_offence}}" => BODY,

    "{{Bank_Name_letter}}" => LETTER_DETAIL,
    "{{ACC_No_IFSC}}" => LETTER_DETAIL,
    "{{Txn_ID}}" => LETTER_DETAIL,
    "{{Fraud_amount}}" => LETTER_DETAIL,
    "{{Txn_date}}" => LETTER_DETAIL,

    "{{Stment_date_from}}" => BODY,
    "{{OutTxn_date}}" => BODY,
    "{{IP_from_date}}" => BODY,
    "{{IP_end_date}}" => BODY,
};

/// Look up the style of a placeholder token.
#[inline]
pub fn rule_for(token: &str) -> Option<&'static StyleRule> {
    STYLE_RULES.get(token)
}

/// Set the formatting of `run` to exactly `rule`.
///
/// The font goes to the ASCII, high-ANSI and East Asian slots so it holds
/// across script boundaries. Bold and underline are written explicitly even
/// when off.
pub fn apply_style(run: &mut Run, rule: &StyleRule) {
    let format = run.format_mut();
    format.font = Some(rule.font.to_string());
    format.east_asia_font = Some(rule.font.to_string());
    format.size_half_points = Some(rule.size_half_points());
    format.bold = Some(rule.bold);
    format.underline = Some(rule.underline);
}

/// Style the first run of `paragraph`.
pub fn style_first_run(paragraph: &mut Paragraph, rule: &StyleRule) -> Result<()> {
    let run = paragraph
        .first_run_mut()
        .ok_or_else(|| Error::StyleApplication("paragraph has no run to style".to_string()))?;
    apply_style(run, rule);
    Ok(())
}
