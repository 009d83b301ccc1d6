//! CSV output of the agreement matrix
//!
//! One row per run plus the COMMON row; one column per channel index.
//! Cells are 1 (frozen) or 0 (reliable).

use crate::agreement::{AgreementMatrix, COMMON_ROW};

/// CSV formatter for an agreement matrix
#[derive(Debug)]
pub struct AgreementCsv<'a> {
    matrix: &'a AgreementMatrix,
}

impl<'a> AgreementCsv<'a> {
    pub fn new(matrix: &'a AgreementMatrix) -> Self {
        Self { matrix }
    }

    /// Escape CSV field (handle commas, quotes, newlines)
    fn escape_field(field: &str) -> String {
        if field.contains(',') || field.contains('"') || field.contains('\n') {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }

    /// Header row: `run,0,1,...,N-1`
    fn header(&self) -> String {
        let mut headers = vec!["run".to_string()];
        headers.extend((0..self.matrix.block_length()).map(|i| i.to_string()));
        headers.join(",")
    }

    fn format_row(name: &str, labels: &[bool]) -> String {
        let mut fields = Vec::with_capacity(labels.len() + 1);
        fields.push(Self::escape_field(name));
        fields.extend(labels.iter().map(|&f| if f { "1" } else { "0" }.to_string()));
        fields.join(",")
    }

    /// Generate CSV output as string
    pub fn to_csv(&self) -> String {
        let mut output = String::new();

        output.push_str(&self.header());
        output.push('\n');

        for (name, labels) in self.matrix.runs.iter().zip(&self.matrix.rows) {
            output.push_str(&Self::format_row(name, labels));
            output.push('\n');
        }

        output.push_str(&Self::format_row(COMMON_ROW, &self.matrix.common));
        output.push('\n');

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::freezer::select_frozen;

    fn matrix(names: &[&str]) -> AgreementMatrix {
        let sets: Vec<_> = names
            .iter()
            .zip([[0.1, 0.2, 0.3], [0.1, 0.3, 0.2]])
            .map(|(n, ber)| (n.to_string(), select_frozen(&ber, 1).unwrap()))
            .collect();
        AgreementMatrix::from_frozen_sets(&sets).unwrap()
    }

    #[test]
    fn test_csv_layout() {
        let csv = AgreementCsv::new(&matrix(&["a", "b"])).to_csv();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "run,0,1,2");
        assert_eq!(lines[1], "a,0,0,1");
        assert_eq!(lines[2], "b,0,1,0");
        assert_eq!(lines[3], "COMMON,0,0,0");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_csv_escapes_run_names() {
        let csv = AgreementCsv::new(&matrix(&["snr,1db", "say \"hi\""])).to_csv();
        assert!(csv.contains("\"say \"\"hi\"\"\",0,1,0"));
        assert!(csv.contains("\"snr,1db\",0,0,1"));
    }
}
