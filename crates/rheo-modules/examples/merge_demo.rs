//! Merge demo: sources feeding a channel merger through a graph.
//!
//! Run with: cargo run -p rheo-modules --example merge_demo
//!
//! Set `RUST_LOG=debug` to watch edges being registered and values propagate.

use rheo_core::{Signal, labels};
use rheo_graph::Graph;
use rheo_modules::{LengthConflictStrategy, MergePort, MergeSignals, SignalSource, SourcePort};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let stereo = Signal::new(
        [[0.1, 0.2, 0.3, 0.4], [0.4, 0.3, 0.2, 0.1]],
        44_100.0,
        labels(["left", "right"]),
    )?;
    let mono = Signal::new([[1.0, -1.0, 1.0]], 44_100.0, labels(["click"]))?;

    let mut graph = Graph::new();
    let first = graph.add(SignalSource::new(stereo));
    let second = graph.add(SignalSource::new(mono));
    let merger = graph.add(MergeSignals::new());
    let output = merger.port(MergePort::Output);

    // --- Ordering ---
    println!("=== Merge Strategies ===\n");

    graph.set_input(
        merger.port(MergePort::SetLengthConflictStrategy),
        LengthConflictStrategy::FillWithZeros.as_str(),
    )?;
    graph.connect(first.port(SourcePort::Value), merger.port(MergePort::AddInput))?;
    graph.connect(second.port(SourcePort::Value), merger.port(MergePort::AddInput))?;

    for strategy in ["first_signal_first", "first_channel_first"] {
        graph.set_input(merger.port(MergePort::SetMergeStrategy), strategy)?;
        let merged = graph.output_as::<Signal>(output)?;
        println!("{strategy}: {merged}");
        for (label, channel) in merged.labels().iter().zip(merged.channels()) {
            println!("  {:<8} {:?}", label.as_deref().unwrap_or("-"), channel);
        }
        println!();
    }

    // --- Conflicts ---
    println!("=== Length Conflicts ===\n");

    graph.set_input(merger.port(MergePort::SetLengthConflictStrategy), "raise_error")?;
    match graph.output_as::<Signal>(output) {
        Ok(merged) => println!("raise_error: {merged}"),
        Err(err) => println!("raise_error: {err}"),
    }

    let rate_change = graph.set_input(second.port(SourcePort::SetRate), 48_000.0);
    println!("changing one source to 48 kHz: {rate_change:?}");
    println!(
        "merger still holds {} inputs",
        merger.borrow().input_count()
    );

    Ok(())
}
