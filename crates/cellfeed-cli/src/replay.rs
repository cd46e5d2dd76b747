//! Replay a JSONL feed script against a cell subscription.
//!
//! The script plays the data source: each line is delivered to the
//! subscription in order. Everything the subscription emits, and every
//! viewport it requests, is written to the output as one JSON line.

use std::cell::{Cell, RefCell};
use std::io::{self, BufRead, Write};
use std::rc::Rc;

use anyhow::{Context, Result};
use cellfeed::{
    CellConfig, CellEvent, CellSubscription, EventKind, FatalOrigin, MemorySource, SubscriptionId,
};
use cellfeed_protocol::{parse_line, value, EmittedEvent, FeedEvent, WireItem};

/// Counts reported after a replay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Non-blank script lines delivered.
    pub lines: usize,
    pub pushes: usize,
    pub titles: usize,
    pub fatals: usize,
    /// Whether the subscription was still live when the script ended.
    pub live: bool,
}

/// Run `script` through a subscription opened with `config`.
///
/// A malformed line stops the replay with an error. So does a handler
/// failure, after the subscription has emitted its fatal event.
pub fn replay<R, W>(
    script: R,
    out: Rc<RefCell<W>>,
    config: CellConfig,
    label: Option<&str>,
) -> Result<ReplaySummary>
where
    R: BufRead,
    W: Write + 'static,
{
    let mut source = MemorySource::new();
    let mut cell = CellSubscription::open(config, &mut source, label)
        .context("Failed to open cell subscription")?;

    let titles = Rc::new(Cell::new(0usize));
    let fatals = Rc::new(Cell::new(0usize));
    register_writers(&mut cell, &out, &titles, &fatals);

    let mut summary = ReplaySummary::default();
    let mut viewports_written = 0;

    for (index, line) in script.lines().enumerate() {
        let number = index + 1;
        let line = line.with_context(|| format!("Failed to read line {number}"))?;
        let Some(event) =
            parse_line(&line).with_context(|| format!("Malformed feed message on line {number}"))?
        else {
            continue;
        };
        summary.lines += 1;

        match event {
            FeedEvent::Meta(meta) => {
                cell.handle_meta(&meta)
                    .with_context(|| format!("Viewport request failed on line {number}"))?;
                viewports_written +=
                    write_viewports(&source, cell.id(), viewports_written, &out)?;
            }
            FeedEvent::Data(push) => {
                summary.pushes += 1;
                cell.handle_data(&push)
                    .with_context(|| format!("Handler failed on line {number}"))?;
            }
            FeedEvent::Fatal(message) => cell.handle_fatal(message),
        }
    }

    summary.titles = titles.get();
    summary.fatals = fatals.get();
    summary.live = cell.is_live();
    tracing::debug!(?summary, "replay finished");
    Ok(summary)
}

fn register_writers<W: Write + 'static>(
    cell: &mut CellSubscription,
    out: &Rc<RefCell<W>>,
    titles: &Rc<Cell<usize>>,
    fatals: &Rc<Cell<usize>>,
) {
    let writer = Rc::clone(out);
    let count = Rc::clone(titles);
    cell.on(EventKind::Title, move |event| {
        if let CellEvent::Title(title) = event {
            count.set(count.get() + 1);
            write_event(
                &writer,
                &EmittedEvent::Title {
                    row: value::to_json(&title.row),
                    column: title.column.clone(),
                },
            )?;
        }
        Ok(())
    });

    let writer = Rc::clone(out);
    cell.on(EventKind::Data, move |event| {
        if let CellEvent::Data(item) = event {
            write_event(&writer, &EmittedEvent::Data(WireItem::from_item(item)))?;
        }
        Ok(())
    });

    let writer = Rc::clone(out);
    let count = Rc::clone(fatals);
    cell.on(EventKind::Fatal, move |event| {
        if let CellEvent::Fatal(fatal) = event {
            count.set(count.get() + 1);
            let origin = match fatal.origin {
                FatalOrigin::Transport => cellfeed_protocol::FatalOrigin::Transport,
                FatalOrigin::Handler => cellfeed_protocol::FatalOrigin::Handler,
            };
            write_event(
                &writer,
                &EmittedEvent::Fatal {
                    origin,
                    message: fatal.message.clone(),
                },
            )?;
        }
        Ok(())
    });
}

/// Write the viewport requests recorded after the first `skip`, returning
/// how many were written.
fn write_viewports<W: Write>(
    source: &MemorySource,
    id: &SubscriptionId,
    skip: usize,
    out: &Rc<RefCell<W>>,
) -> Result<usize> {
    let log = source.log();
    let requests = log.viewports_for(id);
    let fresh = requests.get(skip..).unwrap_or_default();
    for request in fresh {
        write_event(
            out,
            &EmittedEvent::Viewport {
                cells: request.cells.clone(),
                log: request.log,
            },
        )
        .context("Failed to write viewport request")?;
    }
    Ok(fresh.len())
}

fn write_event<W: Write>(out: &Rc<RefCell<W>>, event: &EmittedEvent) -> io::Result<()> {
    let mut line = serde_json::to_vec(event)?;
    line.push(b'\n');
    let mut out = out.borrow_mut();
    out.write_all(&line)?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellfeed::SubscriptionError;
    use cellfeed_core::{CellFormat, GridSource};
    use pretty_assertions::assert_eq;

    const META: &str = r#"{"type":"meta","columns":{"fixed":[{"columns":[{"header":"R"},{"header":"Name"}]}],"scroll":[{"columns":[{"header":"Bid"}]}]}}"#;

    fn config(row: u32, col: u32) -> CellConfig {
        CellConfig::new(GridSource::portfolio("V1"), row, col, CellFormat::Cell)
    }

    fn run(script: &str, config: CellConfig) -> (Result<ReplaySummary>, Vec<String>) {
        let out = Rc::new(RefCell::new(Vec::new()));
        let result = replay(script.as_bytes(), Rc::clone(&out), config, None);
        let text = String::from_utf8(out.borrow().clone()).unwrap();
        (result, text.lines().map(str::to_string).collect())
    }

    #[test]
    fn test_replay_end_to_end() {
        let script = [
            META,
            "",
            r#"{"type":"data","items":[{"v":{"name":"RowX"}},{"v":101.5,"t":"DOUBLE"}]}"#,
            r#"{"type":"data","items":[{"v":{"name":"RowX"}},{"v":102.5,"t":"DOUBLE"}]}"#,
            r#"{"type":"data","items":[{"v":{"name":"RowY"}},{"v":7.5}]}"#,
        ]
        .join("\n");

        let (result, lines) = run(&script, config(3, 1));
        let summary = result.unwrap();

        assert_eq!(
            lines,
            vec![
                r#"{"event":"viewport","cells":["3,0,CELL","3,1,CELL"],"log":false}"#,
                r#"{"event":"title","row":"RowX","column":"Name"}"#,
                r#"{"event":"data","v":101.5,"t":"DOUBLE"}"#,
                r#"{"event":"data","v":102.5,"t":"DOUBLE"}"#,
                r#"{"event":"title","row":"RowY","column":"Name"}"#,
                r#"{"event":"data","v":7.5}"#,
            ]
        );
        assert_eq!(
            summary,
            ReplaySummary {
                lines: 4,
                pushes: 3,
                titles: 2,
                fatals: 0,
                live: true,
            }
        );
    }

    #[test]
    fn test_each_meta_writes_a_viewport() {
        let script = [META, META].join("\n");
        let (result, lines) = run(&script, config(0, 2).with_log(true));
        result.unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            r#"{"event":"viewport","cells":["0,0,CELL","0,2,CELL"],"log":true}"#
        );
    }

    #[test]
    fn test_transport_fatal_is_written() {
        let script = r#"{"type":"fatal","message":"connection lost"}"#;
        let (result, lines) = run(script, config(0, 0));
        let summary = result.unwrap();
        assert_eq!(summary.fatals, 1);
        assert_eq!(
            lines,
            vec![r#"{"event":"fatal","origin":"transport","message":"connection lost"}"#]
        );
    }

    #[test]
    fn test_malformed_line_stops_replay() {
        let script = [META, r#"{"type":"data","items":[{"v":1}]}"#].join("\n");
        let (result, lines) = run(&script, config(0, 1));
        let err = result.unwrap_err();
        assert!(err.to_string().contains("line 2"), "{err}");
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn test_missing_column_is_rejected() {
        let mut config = config(0, 0);
        config.col = None;
        let (result, _) = run(META, config);
        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SubscriptionError>(),
            Some(SubscriptionError::InvalidCoordinate("col"))
        ));
    }

    /// Accepts a fixed number of writes, then fails.
    struct FailAfter {
        remaining: usize,
    }

    impl Write for FailAfter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.remaining == 0 {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
            }
            self.remaining -= 1;
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_failure_is_reraised() {
        let script = [
            META,
            r#"{"type":"data","items":[{"v":"RowX"},{"v":1.5}]}"#,
            r#"{"type":"data","items":[{"v":"RowX"},{"v":2.5}]}"#,
        ]
        .join("\n");
        // Viewport and title succeed, the data write fails
        let out = Rc::new(RefCell::new(FailAfter { remaining: 2 }));
        let err = replay(script.as_bytes(), out, config(0, 1), Some("t")).unwrap_err();

        assert!(err.to_string().contains("line 2"), "{err}");
        match err.downcast_ref::<SubscriptionError>() {
            Some(SubscriptionError::DownstreamHandlerFailure { kind, message, .. }) => {
                assert_eq!(*kind, EventKind::Data);
                assert!(message.starts_with("[t]"), "{message}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
