//! Pattern chains for the CEMIG bill layout.
//!
//! Chains are ordered most specific first. Later entries cover alternate
//! phrasings and column arrangements found on real-world bill variants.

use lazy_static::lazy_static;
use regex::Regex;

/// Quantity column, e.g. "456" or "1.234".
const QUANTITY: &str = r"\d+(?:\.\d{3})*";

/// Unit price column, e.g. "0,95574945". Tariffs carry at least three
/// decimals, which keeps a two-decimal amount out of this column.
const UNIT_PRICE: &str = r"\d+,\d{3,}";

/// Amount column, e.g. "47,75", "1.234,56" or "-225,42".
const AMOUNT: &str = r"-?\d+(?:\.\d{3})*,\d{2}";

const ELECTRICITY_ROWS: &[&str] = &[
    r"Energia\s+El[ée]trica\s*kWh",
    r"Energia\s+(?:Ativa\s+)?Fornecida\s*kWh",
];

const SCEE_ROWS: &[&str] = &[
    r"Energia\s+SCEE\s+s/\s*ICMS\s*kWh",
    r"Energia\s+SCEE\s+ISENTA\s*kWh",
    r"Energia\s+SCEE\D*?kWh",
];

const COMPENSATED_ROWS: &[&str] = &[
    r"Energia\s+compensada\s+GD\s*I+\s*kWh",
    r"Energia\s+compensada\D*?kWh",
];

fn compile(pattern: &str) -> Regex {
    Regex::new(&format!("(?i){}", pattern)).unwrap()
}

/// One pattern per row label capturing the kWh column.
fn quantity_chain(rows: &[&str]) -> Vec<Regex> {
    rows.iter()
        .map(|row| compile(&format!(r"{}\s+({})\b", row, QUANTITY)))
        .collect()
}

/// Per row label: the full row with unit price first, then the short row
/// that has only quantity and amount.
fn amount_chain(rows: &[&str]) -> Vec<Regex> {
    rows.iter()
        .flat_map(|row| {
            [
                compile(&format!(
                    r"{}\s+{}\s+{}\s+({})\b",
                    row, QUANTITY, UNIT_PRICE, AMOUNT
                )),
                compile(&format!(r"{}\s+{}\s+({})\b", row, QUANTITY, AMOUNT)),
            ]
        })
        .collect()
}

lazy_static! {
    // Customer number. Labelled forms take any digit run; the layout
    // validator enforces the digit count.
    pub static ref CLIENT_NUMBER_PATTERNS: Vec<Regex> = vec![
        compile(r"N[º°o]\.?\s*DO\s+CLIENTE\s*:?\s*(\d+)\b"),
        // Header row followed by the value row: "Nº DO CLIENTE Nº DA INSTALAÇÃO 7204076116 3001116735"
        compile(r"N[º°o]\.?\s*DO\s+CLIENTE\s+N[º°o]\.?\s*DA\s+INSTALA[ÇC][ÃA]O\s+(\d+)\b"),
        // Bare value row (client, installation) on its own line
        compile(r"(?m)^\s*(\d{10})\s+\d{10}\s*$"),
    ];

    // Reference month: (month token, year)
    pub static ref REFERENCE_MONTH_PATTERNS: Vec<Regex> = vec![
        compile(r"Referente\s+a\s*:?\s*([A-Z]{3})\s*/\s*(\d{4})\b"),
        compile(r"Referente\s+a\s+Vencimento\s+Valor\s+a\s+pagar\s*\(R\$\)\s+([A-Z]{3})\s*/\s*(\d{4})\b"),
        compile(r"Referente\s+a\s*:?\s*([A-ZÇ]+)\s+(?:de\s+)?(\d{4})\b"),
        compile(r"\b(JAN|FEV|MAR|ABR|MAI|JUN|JUL|AGO|SET|OUT|NOV|DEZ)\s*/\s*(\d{4})\b"),
    ];

    pub static ref ELECTRICITY_QUANTITY_PATTERNS: Vec<Regex> = quantity_chain(ELECTRICITY_ROWS);
    pub static ref ELECTRICITY_VALUE_PATTERNS: Vec<Regex> = amount_chain(ELECTRICITY_ROWS);

    pub static ref SCEE_QUANTITY_PATTERNS: Vec<Regex> = quantity_chain(SCEE_ROWS);
    pub static ref SCEE_VALUE_PATTERNS: Vec<Regex> = amount_chain(SCEE_ROWS);

    pub static ref COMPENSATED_QUANTITY_PATTERNS: Vec<Regex> = quantity_chain(COMPENSATED_ROWS);
    pub static ref COMPENSATED_VALUE_PATTERNS: Vec<Regex> = amount_chain(COMPENSATED_ROWS);

    // Public lighting contribution
    pub static ref PUBLIC_LIGHTING_PATTERNS: Vec<Regex> = vec![
        compile(&format!(r"Contrib\.?\s+Ilum\.?\s+P[úu]b(?:lica)?\.?\s+Municipal\s+({})\b", AMOUNT)),
        compile(&format!(
            r"Contribui[çc][ãa]o\s+(?:de\s+)?Ilumina[çc][ãa]o\s+P[úu]blica(?:\s+Municipal)?\s*:?\s*({})\b",
            AMOUNT
        )),
        compile(&format!(r"Ilum(?:ina[çc][ãa]o)?\.?\s+P[úu]b(?:lica)?\.?\D*?({})\b", AMOUNT)),
    ];
}
