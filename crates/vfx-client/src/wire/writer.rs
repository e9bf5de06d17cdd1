//! Thin element writer over `quick_xml::Writer`.
//!
//! Text passed to [`XmlSink::leaf`] is escaped on output. Element names are
//! written exactly as given, prefix included.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use vfx_core::EncodingError;

pub(crate) struct XmlSink {
    writer: Writer<Vec<u8>>,
}

impl XmlSink {
    pub(crate) fn new() -> Self {
        Self {
            writer: Writer::new(Vec::with_capacity(4096)),
        }
    }

    fn emit(&mut self, event: Event<'_>) -> Result<(), EncodingError> {
        self.writer
            .write_event(event)
            .map_err(|e| EncodingError::Xml(e.to_string()))
    }

    pub(crate) fn declaration(&mut self) -> Result<(), EncodingError> {
        self.emit(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
    }

    pub(crate) fn open_with(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), EncodingError> {
        let mut start = BytesStart::new(name);
        for attr in attrs {
            start.push_attribute(*attr);
        }
        self.emit(Event::Start(start))
    }

    pub(crate) fn open(&mut self, name: &str) -> Result<(), EncodingError> {
        self.emit(Event::Start(BytesStart::new(name)))
    }

    pub(crate) fn close(&mut self, name: &str) -> Result<(), EncodingError> {
        self.emit(Event::End(BytesEnd::new(name)))
    }

    pub(crate) fn empty(&mut self, name: &str) -> Result<(), EncodingError> {
        self.emit(Event::Empty(BytesStart::new(name)))
    }

    /// `<name>text</name>`
    pub(crate) fn leaf(&mut self, name: &str, text: &str) -> Result<(), EncodingError> {
        self.open(name)?;
        self.emit(Event::Text(BytesText::new(text)))?;
        self.close(name)
    }

    /// Open `name`, run `body`, close `name`.
    pub(crate) fn element<F>(&mut self, name: &str, body: F) -> Result<(), EncodingError>
    where
        F: FnOnce(&mut Self) -> Result<(), EncodingError>,
    {
        self.open(name)?;
        body(self)?;
        self.close(name)
    }

    pub(crate) fn finish(self) -> Result<String, EncodingError> {
        String::from_utf8(self.writer.into_inner()).map_err(|e| EncodingError::Xml(e.to_string()))
    }
}
