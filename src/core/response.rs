use quick_xml::events::Event;
use quick_xml::reader::Reader;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Outcome of a carrier rate lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum CarrierResponse {
    Rating { total_charge: Decimal },
    Error { messages: Vec<String> },
    /// Neither an error nor a rating payload.
    Unrecognized,
}

impl CarrierResponse {
    pub fn parse(body: &str) -> Self {
        let scan = match scan(body) {
            Ok(scan) => scan,
            Err(e) => {
                tracing::debug!("Carrier response is not well-formed XML: {}", e);
                return Self::Unrecognized;
            }
        };

        if scan.saw_error {
            Self::Error {
                messages: scan.messages,
            }
        } else if scan.saw_rating {
            Self::Rating {
                total_charge: parse_charge(scan.total_charge.as_deref().unwrap_or_default()),
            }
        } else {
            Self::Unrecognized
        }
    }
}

/// Charges that are not a number, plain or in exponent form, count as zero.
pub fn parse_charge(raw: &str) -> Decimal {
    let raw = raw.trim();
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .unwrap_or(Decimal::ZERO)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Message,
    TotalCharge,
}

#[derive(Debug, Default)]
struct Scan {
    saw_error: bool,
    saw_rating: bool,
    messages: Vec<String>,
    total_charge: Option<String>,
}

impl Scan {
    fn mark(&mut self, name: &[u8]) -> Option<Field> {
        match name {
            b"errorResponse" => {
                self.saw_error = true;
                None
            }
            b"ratingResponse" => {
                self.saw_rating = true;
                None
            }
            b"message" => Some(Field::Message),
            b"totalCharge" => Some(Field::TotalCharge),
            _ => None,
        }
    }

    fn finish(&mut self, field: Field, text: &str) {
        match field {
            Field::Message => self.messages.push(text.trim().to_string()),
            Field::TotalCharge => {
                if self.total_charge.is_none() {
                    self.total_charge = Some(text.trim().to_string());
                }
            }
        }
    }
}

fn scan(body: &str) -> Result<Scan, quick_xml::Error> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut scan = Scan::default();
    let mut capture: Option<Field> = None;
    let mut text = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if let Some(field) = scan.mark(e.local_name().as_ref()) {
                    capture = Some(field);
                    text.clear();
                }
            }
            Event::Empty(e) => {
                if let Some(field) = scan.mark(e.local_name().as_ref()) {
                    scan.finish(field, "");
                }
            }
            Event::Text(t) => {
                if capture.is_some() {
                    text.push_str(&t.unescape()?);
                }
            }
            Event::CData(c) => {
                if capture.is_some() {
                    text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Event::End(e) => {
                if let Some(field) = capture {
                    let closes = matches!(
                        (field, e.local_name().as_ref()),
                        (Field::Message, b"message") | (Field::TotalCharge, b"totalCharge")
                    );
                    if closes {
                        scan.finish(field, &text);
                        capture = None;
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(scan)
}
