//! Tick Replay Adapter
//!
//! Feeds a JSON-lines tick file through a [`Dispatcher`] and writes every
//! emitted order as one JSON line. Positions are taken from the file as-is;
//! nothing is matched or filled here.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines, Write};
use std::path::Path;

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::application::{Dispatcher, TickOrders};
use crate::domain::{MarketTick, Side};

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid tick on line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to encode order: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Streams [`MarketTick`]s from JSON lines, skipping blank lines
pub struct TickReader<R> {
    lines: Lines<R>,
    line: usize,
}

impl<R: BufRead> TickReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line: 0,
        }
    }
}

impl TickReader<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ReplayError> {
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }
}

impl<R: BufRead> Iterator for TickReader<R> {
    type Item = Result<MarketTick, ReplayError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            self.line += 1;
            if line.trim().is_empty() {
                continue;
            }
            let line_no = self.line;
            return Some(
                serde_json::from_str(&line).map_err(|source| ReplayError::Json {
                    line: line_no,
                    source,
                }),
            );
        }
    }
}

/// One output line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRecord<'a> {
    pub tick: u64,
    pub instrument: &'a str,
    pub side: Side,
    pub price: Decimal,
    pub quantity: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub ticks: u64,
    pub orders: u64,
}

/// Write one tick's orders, returning how many were written
pub fn write_orders<W: Write>(out: &mut W, tick_orders: &TickOrders) -> Result<usize, ReplayError> {
    let mut written = 0;
    for (instrument, orders) in &tick_orders.orders {
        for order in orders {
            let record = OrderRecord {
                tick: tick_orders.tick,
                instrument,
                side: order.side(),
                price: order.price,
                quantity: order.quantity,
            };
            serde_json::to_writer(&mut *out, &record).map_err(ReplayError::Encode)?;
            out.write_all(b"\n")?;
            written += 1;
        }
    }
    Ok(written)
}

/// Drive every tick from `reader` through `dispatcher`
pub fn replay<R, W>(
    dispatcher: &mut Dispatcher,
    ticks: TickReader<R>,
    out: &mut W,
    parallel: bool,
) -> Result<ReplaySummary, ReplayError>
where
    R: BufRead,
    W: Write,
{
    let mut summary = ReplaySummary::default();
    for tick in ticks {
        let tick = tick?;
        let tick_orders = if parallel {
            dispatcher.on_tick_parallel(&tick)
        } else {
            dispatcher.on_tick(&tick)
        };
        let written = write_orders(out, &tick_orders)?;
        debug!("Replayed tick {} ({} orders)", tick.tick, written);
        summary.ticks += 1;
        summary.orders += written as u64;
    }
    out.flush()?;
    info!(
        "Replay finished: {} ticks, {} orders",
        summary.ticks, summary.orders
    );
    Ok(summary)
}
