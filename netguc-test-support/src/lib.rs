//! Shared test utilities for the netguc crates.

pub mod ci;

pub mod fixtures {
    //! Small edge-list files used across unit and integration tests.

    use std::{
        fs, io,
        path::{Path, PathBuf},
    };

    /// Triangle on nodes 1, 2 and 3.
    pub const TRIANGLE_MTX: &str = "\
%%MatrixMarket matrix coordinate pattern symmetric
3 3 3
1 2
2 3
1 3
";

    /// Path 1-2-3-4.
    pub const PATH_MTX: &str = "\
%%MatrixMarket matrix coordinate pattern symmetric
4 4 3
1 2
2 3
3 4
";

    /// Triangle plus node 4, which only appears on a self-loop line and so
    /// loads as an isolated node.
    pub const TRIANGLE_WITH_ISOLATED_MTX: &str = "\
%%MatrixMarket matrix coordinate pattern symmetric
% node 4 is isolated
4 4 4
1 2
2 3
1 3
4 4
";

    /// Two triangles joined by the bridge 3-4, with sparse labels.
    pub const BOWTIE_MTX: &str = "\
%%MatrixMarket matrix coordinate pattern symmetric
60 60 7
10 20
20 30
30 10
30 40
40 50
50 60
60 40
";

    /// An edge line holding a non-integer token.
    pub const MALFORMED_EDGE_MTX: &str = "\
%%MatrixMarket matrix coordinate pattern symmetric
3 3 2
1 2
2 three
";

    /// Writes `contents` to `dir/name`, returning the full path.
    ///
    /// # Errors
    /// Returns any I/O error raised while writing.
    ///
    /// # Examples
    /// ```
    /// use netguc_test_support::fixtures::{TRIANGLE_MTX, write_fixture};
    ///
    /// let dir = tempfile::tempdir()?;
    /// let path = write_fixture(dir.path(), "triangle.mtx", TRIANGLE_MTX)?;
    /// assert!(path.ends_with("triangle.mtx"));
    /// # Ok::<(), std::io::Error>(())
    /// ```
    pub fn write_fixture(dir: &Path, name: &str, contents: &str) -> io::Result<PathBuf> {
        let path = dir.join(name);
        fs::write(&path, contents)?;
        Ok(path)
    }
}

pub mod tracing {
    //! A subscriber layer that records spans and events for assertions.

    use std::{
        collections::BTreeMap,
        fmt,
        sync::{Arc, Mutex, PoisonError},
    };

    use tracing::{
        Event, Level, Subscriber,
        field::{Field, Visit},
        span::{Attributes, Id, Record},
    };
    use tracing_subscriber::{Layer, layer::Context, registry::LookupSpan};

    /// A span captured when it closed.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct SpanRecord {
        /// Span name from its metadata.
        pub name: String,
        /// Fields recorded at creation or later through `Span::record`.
        pub fields: BTreeMap<String, String>,
    }

    /// An event captured when it was emitted.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct EventRecord {
        /// Event level.
        pub level: Level,
        /// Name of the innermost span the event was emitted in.
        pub span: Option<String>,
        /// Event fields, including `message`.
        pub fields: BTreeMap<String, String>,
    }

    impl EventRecord {
        /// The event's message, if it has one.
        #[must_use]
        pub fn message(&self) -> Option<&str> {
            self.fields.get("message").map(String::as_str)
        }
    }

    /// Records closed spans and emitted events in order.
    ///
    /// Clones share the same storage, so a test can keep one handle while the
    /// subscriber owns another.
    ///
    /// # Examples
    /// ```
    /// use netguc_test_support::tracing::RecordingLayer;
    /// use tracing_subscriber::layer::SubscriberExt;
    ///
    /// let layer = RecordingLayer::default();
    /// let subscriber = tracing_subscriber::registry().with(layer.clone());
    /// tracing::subscriber::with_default(subscriber, || {
    ///     tracing::info_span!("demo.op", size = 3).in_scope(|| tracing::info!("inside"));
    /// });
    /// let span = layer.span_named("demo.op").expect("span recorded");
    /// assert_eq!(span.fields.get("size").map(String::as_str), Some("3"));
    /// assert_eq!(layer.events()[0].span.as_deref(), Some("demo.op"));
    /// ```
    #[derive(Clone, Default)]
    pub struct RecordingLayer {
        spans: Arc<Mutex<Vec<SpanRecord>>>,
        events: Arc<Mutex<Vec<EventRecord>>>,
    }

    impl RecordingLayer {
        /// Closed spans in closing order.
        #[must_use]
        pub fn spans(&self) -> Vec<SpanRecord> {
            self.spans
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        /// Events in emission order.
        #[must_use]
        pub fn events(&self) -> Vec<EventRecord> {
            self.events
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        /// First closed span called `name`.
        #[must_use]
        pub fn span_named(&self, name: &str) -> Option<SpanRecord> {
            self.spans().into_iter().find(|span| span.name == name)
        }

        /// Closed spans called `name`, in closing order.
        #[must_use]
        pub fn spans_named(&self, name: &str) -> Vec<SpanRecord> {
            self.spans()
                .into_iter()
                .filter(|span| span.name == name)
                .collect()
        }

        /// Events emitted at `level`.
        #[must_use]
        pub fn events_at(&self, level: Level) -> Vec<EventRecord> {
            self.events()
                .into_iter()
                .filter(|event| event.level == level)
                .collect()
        }
    }

    struct OpenSpan {
        name: &'static str,
        fields: BTreeMap<String, String>,
    }

    impl<S> Layer<S> for RecordingLayer
    where
        S: Subscriber + for<'lookup> LookupSpan<'lookup>,
    {
        fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
            let Some(span) = ctx.span(id) else {
                return;
            };
            let mut open = OpenSpan {
                name: attrs.metadata().name(),
                fields: BTreeMap::new(),
            };
            attrs.record(&mut Fields(&mut open.fields));
            span.extensions_mut().insert(open);
        }

        fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
            let Some(span) = ctx.span(id) else {
                return;
            };
            if let Some(open) = span.extensions_mut().get_mut::<OpenSpan>() {
                values.record(&mut Fields(&mut open.fields));
            }
        }

        fn on_close(&self, id: Id, ctx: Context<'_, S>) {
            let Some(span) = ctx.span(&id) else {
                return;
            };
            let Some(open) = span.extensions_mut().remove::<OpenSpan>() else {
                return;
            };
            self.spans
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(SpanRecord {
                    name: open.name.to_owned(),
                    fields: open.fields,
                });
        }

        fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
            let mut fields = BTreeMap::new();
            event.record(&mut Fields(&mut fields));
            let span = ctx
                .event_span(event)
                .map(|span| span.name().to_owned());
            self.events
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(EventRecord {
                    level: *event.metadata().level(),
                    span,
                    fields,
                });
        }
    }

    /// Stores every field as its display form; strings lose their quotes.
    struct Fields<'a>(&'a mut BTreeMap<String, String>);

    impl Visit for Fields<'_> {
        fn record_str(&mut self, field: &Field, value: &str) {
            self.0.insert(field.name().to_owned(), value.to_owned());
        }

        fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
            self.0.insert(field.name().to_owned(), value.to_string());
        }

        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            self.0.insert(field.name().to_owned(), format!("{value:?}"));
        }
    }
}
