#![allow(clippy::missing_docs_in_private_items)]
#![allow(clippy::arithmetic_side_effects)]
#![allow(clippy::cast_precision_loss)]

use chainmap::{KeyValueStore, MIN_SLOTS};
use plotters::prelude::*;
use rand::{Rng, seq::SliceRandom};

// Keys drawn for the insert phase; duplicates are dropped before inserting
const KEYS_DRAWN: usize = 5_000;
const KEY_RANGE: u64 = 1_000_000_000;

// Density band the store keeps to, drawn as reference lines
const MAX_DENSITY: f64 = 0.7;
const MIN_DENSITY: f64 = 0.2;

const LENGTH_PLOT: &str = "slot_array_length.png";
const DENSITY_PLOT: &str = "population_density.png";

const FONT_FAMILY: &str = "sans-serif";
const TEXT_SIZE: u32 = 16;
const TITLE_SIZE: u32 = 35;

// State of the store after one operation
struct Sample {
    op: usize,
    entries: usize,
    slots: usize,
    density: f64,
    longest_chain: usize,
}

fn sample(op: usize, store: &KeyValueStore<u64, u64>) -> Sample {
    Sample {
        op,
        entries: store.len(),
        slots: store.capacity(),
        density: store.population_density(),
        longest_chain: store.longest_chain(),
    }
}

fn plot_length(samples: &[Sample]) -> Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::new(LENGTH_PLOT, (1200, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    let max_slots = samples.iter().map(|s| s.slots).max().unwrap_or(MIN_SLOTS);

    let mut chart = ChartBuilder::on(&root)
        .caption("Slot Array Length per Operation", (FONT_FAMILY, TITLE_SIZE))
        .margin(15)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d(0..samples.len(), 0..(max_slots + max_slots / 10))?;

    chart
        .configure_mesh()
        .x_desc("Operation (inserts, then deletes)")
        .y_desc("Count")
        .axis_desc_style((FONT_FAMILY, TEXT_SIZE))
        .draw()?;

    let slots_style = ShapeStyle::from(&BLUE).stroke_width(2);
    chart
        .draw_series(LineSeries::new(samples.iter().map(|s| (s.op, s.slots)), slots_style))?
        .label("Slot array length")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], slots_style));

    let entries_style = ShapeStyle::from(&RED).stroke_width(2);
    chart
        .draw_series(LineSeries::new(samples.iter().map(|s| (s.op, s.entries)), entries_style))?
        .label("Entries")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], entries_style));

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .position(SeriesLabelPosition::UpperLeft)
        .draw()?;

    root.present()?;
    Ok(())
}

fn plot_density(samples: &[Sample]) -> Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::new(DENSITY_PLOT, (1200, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    let last_op = samples.len().saturating_sub(1);

    let mut chart = ChartBuilder::on(&root)
        .caption("Population Density per Operation", (FONT_FAMILY, TITLE_SIZE))
        .margin(15)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d(0..samples.len(), 0.0..1.0)?;

    chart
        .configure_mesh()
        .x_desc("Operation (inserts, then deletes)")
        .y_desc("Entries per slot")
        .axis_desc_style((FONT_FAMILY, TEXT_SIZE))
        .draw()?;

    let band_style = ShapeStyle::from(&BLACK.mix(0.3)).stroke_width(1);
    for bound in [MAX_DENSITY, MIN_DENSITY] {
        chart.draw_series(LineSeries::new(vec![(0, bound), (last_op, bound)], band_style))?;
    }

    let density_style = ShapeStyle::from(&RGBColor(50, 180, 50)).stroke_width(2);
    chart
        .draw_series(LineSeries::new(samples.iter().map(|s| (s.op, s.density)), density_style))?
        .label("Population density")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], density_style));

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .position(SeriesLabelPosition::UpperRight)
        .draw()?;

    root.present()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::builder().init();

    let mut rng = rand::rng();
    let mut keys: Vec<u64> = (0..KEYS_DRAWN).map(|_| rng.random_range(0..KEY_RANGE)).collect();
    keys.sort_unstable();
    keys.dedup();
    keys.shuffle(&mut rng);

    let mut store = KeyValueStore::new();
    let mut samples = Vec::with_capacity(keys.len() * 2 + 1);
    samples.push(sample(0, &store));

    for &key in &keys {
        store.set(key, key);
        samples.push(sample(samples.len(), &store));
    }
    println!("Inserted {} keys into {} slots", store.len(), store.capacity());

    keys.shuffle(&mut rng);
    for key in &keys {
        store.delete(key)?;
        samples.push(sample(samples.len(), &store));
    }
    println!("Deleted every key, {} slots left", store.capacity());

    let longest_chain = samples.iter().map(|s| s.longest_chain).max().unwrap_or_default();
    let peak_density = samples.iter().map(|s| s.density).fold(0.0, f64::max);
    println!("Longest chain seen: {longest_chain}, peak density: {peak_density:.3}");

    plot_length(&samples)?;
    plot_density(&samples)?;

    println!("Generated plot images: {LENGTH_PLOT}, {DENSITY_PLOT}");

    Ok(())
}
