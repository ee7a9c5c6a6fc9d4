use super::error::ParsedNameOrBytes;

use quick_xml::events::Event;

use std::fmt;

/// Short owned description of an xml event, for error messages
#[derive(Debug)]
pub(crate) struct EventSummary {
    name: Option<ParsedNameOrBytes>,
    e_type: &'static str,
}

impl fmt::Display for EventSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "element {name} with type {}", self.e_type),
            None => write!(f, "unnamed element with type {}", self.e_type),
        }
    }
}

impl EventSummary {
    pub(crate) fn new(e: &Event) -> Self {
        let name = match e {
            Event::Start(s) | Event::Empty(s) => Some(ParsedNameOrBytes::from(s.name())),
            Event::End(end) => Some(ParsedNameOrBytes::from(end.name())),
            _ => None,
        };

        Self {
            name,
            e_type: event_type(e),
        }
    }

    pub(crate) fn eof() -> Self {
        Self {
            name: None,
            e_type: "eof",
        }
    }
}

fn event_type(event: &Event) -> &'static str {
    match event {
        Event::Start(_) => "start",
        Event::End(_) => "end",
        Event::Empty(_) => "empty",
        Event::Text(_) => "text",
        Event::Comment(_) => "comment",
        Event::CData(_) => "cdata",
        Event::Decl(_) => "decl",
        Event::PI(_) => "pi",
        Event::DocType(_) => "doctype",
        Event::Eof => "eof",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quick_xml::events::BytesStart;

    #[test]
    fn describes_events() {
        let start = Event::Start(BytesStart::new("PointData"));
        assert_eq!(
            EventSummary::new(&start).to_string(),
            "element PointData with type start"
        );
        assert_eq!(EventSummary::eof().to_string(), "unnamed element with type eof");
    }
}
