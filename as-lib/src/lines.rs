
// One source statement: an optional label, an optional upper-cased opcode
// (directives share the slot), and the comma-split operand texts. The raw
// line is kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub line_no: usize,
    pub label: Option<String>,
    pub opcode: Option<String>,
    pub operands: Vec<String>,
    pub raw: String,
}

fn split_operands(rest: &str) -> Vec<String> {
    rest.split(',')
        .filter(|piece| !piece.is_empty())
        .map(|piece| piece.trim().to_string())
        .collect()
}

// Comments run from the first ';' to the end of the line. Blank lines
// produce no record. A line may carry a label and nothing else.
pub fn parse_lines(source: &str) -> Vec<Line> {
    let mut lines = Vec::new();

    for (raw, line_no) in source.lines().zip(1..) {
        let mut text = match raw.find(';') {
            Some(pos) => &raw[..pos],
            None => raw,
        };
        text = text.trim();
        if text.is_empty() {
            continue;
        }

        let mut line = Line {
            line_no,
            label: None,
            opcode: None,
            operands: Vec::new(),
            raw: raw.to_string(),
        };

        if let Some(colon) = text.find(':') {
            let label = text[..colon].trim();
            if !label.is_empty() {
                line.label = Some(label.to_string());
            }
            text = text[colon + 1..].trim();
        }

        if text.is_empty() {
            lines.push(line);
            continue;
        }

        let (opcode, rest) = match text.split_once(char::is_whitespace) {
            Some((opcode, rest)) => (opcode, rest.trim()),
            None => (text, ""),
        };
        line.opcode = Some(opcode.to_uppercase());
        if !rest.is_empty() {
            line.operands = split_operands(rest);
        }

        lines.push(line);
    }

    lines
}
