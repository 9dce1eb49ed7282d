//! Per-context usage accounting.

use std::collections::{BTreeSet, VecDeque};
use std::time::{Duration, Instant};

/// Number of operation names retained per context.
pub const HISTORY_CAPACITY: usize = 100;

/// Coarse classification of a recorded operation name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpCategory {
    /// Canvas draw call (fillRect, fillText, drawImage, ...).
    Draw,
    /// Pixel readback via getImageData or readPixels.
    ImageDataRead,
    /// Canvas export via toDataURL or toBlob.
    DataUrlExport,
    /// Text metrics readback via measureText.
    TextMeasure,
    /// WebGL getParameter.
    ParameterQuery,
    /// WebGL extension enumeration.
    ExtensionQuery,
    /// WebGL shader precision query.
    ShaderQuery,
    /// WebGL buffer manipulation.
    BufferOp,
    /// WebGL texture manipulation.
    TextureOp,
    /// WebGL render call (drawArrays, drawElements).
    Render,
    /// Anything unrecognized.
    Other,
}

impl OpCategory {
    /// Classifies an operation by its API name.
    pub fn of(operation: &str) -> Self {
        match operation {
            "fillRect" | "strokeRect" | "fillText" | "strokeText" | "drawImage" => Self::Draw,
            "getImageData" | "readPixels" => Self::ImageDataRead,
            "toDataURL" | "toBlob" => Self::DataUrlExport,
            "measureText" => Self::TextMeasure,
            "getParameter" => Self::ParameterQuery,
            "getExtension" | "getSupportedExtensions" => Self::ExtensionQuery,
            "getShaderPrecisionFormat" => Self::ShaderQuery,
            "drawArrays" | "drawElements" => Self::Render,
            name if name.contains("Buffer") || name.starts_with("buffer") => Self::BufferOp,
            name if name.contains("Texture") || name.starts_with("tex") => Self::TextureOp,
            _ => Self::Other,
        }
    }

    /// Whether this category counts as a state query.
    pub fn is_query(self) -> bool {
        matches!(
            self,
            Self::ParameterQuery | Self::ExtensionQuery | Self::ShaderQuery
        )
    }

    /// Whether this category counts as a render call.
    pub fn is_render(self) -> bool {
        matches!(self, Self::Render)
    }

    /// Whether this category reads fingerprintable canvas output.
    pub fn is_read(self) -> bool {
        matches!(
            self,
            Self::ImageDataRead | Self::DataUrlExport | Self::TextMeasure
        )
    }
}

/// Accumulated usage record for one context.
#[derive(Debug, Clone)]
pub struct UsageStats {
    /// Canvas draw calls.
    pub draws: u64,
    /// Read-side canvas calls (pixel reads, exports, text metrics).
    pub reads: u64,
    /// getImageData calls.
    pub image_data_reads: u64,
    /// toDataURL/toBlob calls.
    pub data_url_exports: u64,
    /// getParameter calls.
    pub parameter_queries: u64,
    /// Extension enumeration calls.
    pub extension_queries: u64,
    /// Shader precision queries.
    pub shader_queries: u64,
    /// Buffer manipulation calls.
    pub buffer_ops: u64,
    /// Texture manipulation calls.
    pub texture_ops: u64,
    /// Render calls.
    pub render_ops: u64,
    /// Every recorded operation, including unrecognized ones.
    pub total_ops: u64,
    history: VecDeque<String>,
    queried_params: BTreeSet<String>,
    current_query_run: u32,
    longest_query_run: u32,
    first_op: Option<Instant>,
    last_op: Option<Instant>,
    flagged: bool,
}

impl UsageStats {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self {
            draws: 0,
            reads: 0,
            image_data_reads: 0,
            data_url_exports: 0,
            parameter_queries: 0,
            extension_queries: 0,
            shader_queries: 0,
            buffer_ops: 0,
            texture_ops: 0,
            render_ops: 0,
            total_ops: 0,
            history: VecDeque::with_capacity(HISTORY_CAPACITY),
            queried_params: BTreeSet::new(),
            current_query_run: 0,
            longest_query_run: 0,
            first_op: None,
            last_op: None,
            flagged: false,
        }
    }

    /// Records an operation observed now.
    pub fn record(&mut self, operation: &str, parameter: Option<&str>) {
        self.record_at(operation, parameter, Instant::now());
    }

    /// Records an operation with an explicit timestamp.
    pub fn record_at(&mut self, operation: &str, parameter: Option<&str>, at: Instant) {
        self.total_ops += 1;
        if self.first_op.is_none() {
            self.first_op = Some(at);
        }
        self.last_op = Some(at);

        self.history.push_back(operation.to_string());
        if self.history.len() > HISTORY_CAPACITY {
            self.history.pop_front();
        }

        let category = OpCategory::of(operation);
        match category {
            OpCategory::Draw => self.draws += 1,
            OpCategory::ImageDataRead => {
                self.image_data_reads += 1;
                self.reads += 1;
            }
            OpCategory::DataUrlExport => {
                self.data_url_exports += 1;
                self.reads += 1;
            }
            OpCategory::TextMeasure => self.reads += 1,
            OpCategory::ParameterQuery => {
                self.parameter_queries += 1;
                if let Some(parameter) = parameter {
                    self.queried_params.insert(parameter.to_string());
                }
            }
            OpCategory::ExtensionQuery => self.extension_queries += 1,
            OpCategory::ShaderQuery => self.shader_queries += 1,
            OpCategory::BufferOp => self.buffer_ops += 1,
            OpCategory::TextureOp => self.texture_ops += 1,
            OpCategory::Render => self.render_ops += 1,
            OpCategory::Other => {}
        }

        // A query run is only broken by a render call, so probes that
        // pad their queries with buffer or texture churn still count.
        if category.is_query() {
            self.current_query_run += 1;
            self.longest_query_run = self.longest_query_run.max(self.current_query_run);
        } else if category.is_render() {
            self.current_query_run = 0;
        }
    }

    /// Total state queries across all query categories.
    pub fn queries(&self) -> u64 {
        self.parameter_queries + self.extension_queries + self.shader_queries
    }

    /// Recorded operation names, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &str> {
        self.history.iter().map(String::as_str)
    }

    /// Number of retained operation names.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Distinct parameters passed to getParameter.
    pub fn queried_parameters(&self) -> &BTreeSet<String> {
        &self.queried_params
    }

    /// Longest run of queries with no intervening render call.
    pub fn longest_query_run(&self) -> u32 {
        self.longest_query_run
    }

    /// Time between the first and last recorded operation.
    pub fn span(&self) -> Option<Duration> {
        match (self.first_op, self.last_op) {
            (Some(first), Some(last)) => Some(last.duration_since(first)),
            _ => None,
        }
    }

    /// Whether this context has already been reported as suspicious.
    pub fn was_flagged(&self) -> bool {
        self.flagged
    }

    pub(crate) fn mark_flagged(&mut self) {
        self.flagged = true;
    }
}

impl Default for UsageStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_mapping() {
        assert_eq!(OpCategory::of("fillRect"), OpCategory::Draw);
        assert_eq!(OpCategory::of("getImageData"), OpCategory::ImageDataRead);
        assert_eq!(OpCategory::of("readPixels"), OpCategory::ImageDataRead);
        assert_eq!(OpCategory::of("toDataURL"), OpCategory::DataUrlExport);
        assert_eq!(OpCategory::of("measureText"), OpCategory::TextMeasure);
        assert_eq!(OpCategory::of("getParameter"), OpCategory::ParameterQuery);
        assert_eq!(
            OpCategory::of("getSupportedExtensions"),
            OpCategory::ExtensionQuery
        );
        assert_eq!(OpCategory::of("bindBuffer"), OpCategory::BufferOp);
        assert_eq!(OpCategory::of("bufferData"), OpCategory::BufferOp);
        assert_eq!(OpCategory::of("texImage2D"), OpCategory::TextureOp);
        assert_eq!(OpCategory::of("drawArrays"), OpCategory::Render);
        assert_eq!(OpCategory::of("scrollIntoView"), OpCategory::Other);
    }

    #[test]
    fn test_image_data_read_counts_as_read() {
        let mut stats = UsageStats::new();
        stats.record("getImageData", None);
        stats.record("toDataURL", None);
        stats.record("measureText", None);

        assert_eq!(stats.reads, 3);
        assert_eq!(stats.image_data_reads, 1);
        assert_eq!(stats.data_url_exports, 1);
    }

    #[test]
    fn test_history_bounded_to_capacity() {
        let mut stats = UsageStats::new();
        for i in 0..150 {
            stats.record(&format!("op{i}"), None);
        }

        assert_eq!(stats.history_len(), HISTORY_CAPACITY);
        assert_eq!(stats.total_ops, 150);
        // Oldest 50 evicted; the window starts at op50.
        assert_eq!(stats.history().next(), Some("op50"));
        assert_eq!(stats.history().last(), Some("op149"));
    }

    #[test]
    fn test_query_run_survives_buffer_churn() {
        let mut stats = UsageStats::new();
        stats.record("getParameter", Some("MAX_TEXTURE_SIZE"));
        stats.record("bindBuffer", None);
        stats.record("getParameter", Some("MAX_VERTEX_ATTRIBS"));
        stats.record("getSupportedExtensions", None);

        assert_eq!(stats.longest_query_run(), 3);
    }

    #[test]
    fn test_query_run_reset_by_render() {
        let mut stats = UsageStats::new();
        for _ in 0..4 {
            stats.record("getParameter", Some("MAX_TEXTURE_SIZE"));
        }
        stats.record("drawArrays", None);
        stats.record("getParameter", Some("MAX_TEXTURE_SIZE"));

        assert_eq!(stats.longest_query_run(), 4);
    }

    #[test]
    fn test_repeat_queries_collapse_to_distinct() {
        let mut stats = UsageStats::new();
        stats.record("getParameter", Some("VENDOR"));
        stats.record("getParameter", Some("VENDOR"));
        stats.record("getParameter", Some("RENDERER"));

        assert_eq!(stats.parameter_queries, 3);
        assert_eq!(stats.queried_parameters().len(), 2);
    }

    #[test]
    fn test_span_tracks_first_and_last() {
        let mut stats = UsageStats::new();
        assert!(stats.span().is_none());

        let base = Instant::now();
        stats.record_at("fillRect", None, base);
        stats.record_at("fillRect", None, base + Duration::from_millis(250));

        assert_eq!(stats.span(), Some(Duration::from_millis(250)));
    }
}
