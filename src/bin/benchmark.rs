//! Step throughput benchmark across grid sizes

use std::time::Instant;

use life_engine::Engine;
use life_engine::domain::presets;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn random_engine(size: usize) -> life_engine::Result<Engine> {
    let mut engine = Engine::new(size, size)?;
    engine.randomize(&mut StdRng::seed_from_u64(size as u64), 0.25);
    Ok(engine)
}

fn benchmark_step(size: usize, iterations: u32) -> life_engine::Result<f64> {
    let mut engine = random_engine(size)?;

    let start = Instant::now();
    for _ in 0..iterations {
        engine.step();
    }
    Ok(start.elapsed().as_secs_f64() * 1000.0 / iterations as f64)
}

#[cfg(feature = "parallel")]
fn benchmark_step_parallel(size: usize, iterations: u32) -> life_engine::Result<f64> {
    let mut engine = random_engine(size)?;

    let start = Instant::now();
    for _ in 0..iterations {
        engine.step_parallel();
    }
    Ok(start.elapsed().as_secs_f64() * 1000.0 / iterations as f64)
}

#[cfg(not(feature = "parallel"))]
fn benchmark_step_parallel(_size: usize, _iterations: u32) -> life_engine::Result<f64> {
    Ok(0.0)
}

fn benchmark_render(size: usize, iterations: u32) -> life_engine::Result<f64> {
    let engine = random_engine(size)?;

    let start = Instant::now();
    let mut bytes = 0;
    for _ in 0..iterations {
        bytes += engine.render().len();
    }
    let elapsed = start.elapsed().as_secs_f64() * 1000.0 / iterations as f64;
    info!(size, bytes, "render finished");
    Ok(elapsed)
}

fn main() -> life_engine::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Life Engine Step Benchmark ===\n");

    let sizes = [100, 500, 1000, 2000, 5000];
    let iterations = 20;

    println!(
        "{:>10} {:>12} {:>12} {:>14} {:>12}",
        "Size", "Step", "Step+Par", "Mcells/sec", "Render"
    );
    println!("{:-<66}", "");

    for size in sizes {
        let step_ms = benchmark_step(size, iterations)?;
        let par_ms = benchmark_step_parallel(size, iterations)?;
        let render_ms = benchmark_render(size, iterations.min(5))?;
        let cells = (size * size) as f64;

        let par_str = if par_ms > 0.0 {
            format!("{:>12.2}", par_ms)
        } else {
            format!("{:>12}", "-")
        };

        println!(
            "{:>10} {:>12.2} {} {:>14.1} {:>12.2}",
            format!("{}x{}", size, size),
            step_ms,
            par_str,
            cells / (step_ms / 1000.0) / 1_000_000.0,
            render_ms
        );
    }

    println!("\n=== Gosper Glider Gun, 1000 generations on 200x200 ===\n");

    let mut engine = Engine::new(200, 200)?;
    engine.seed(&presets::GLIDER_GUN.pattern()?, 10, 10);
    let start = Instant::now();
    engine.advance(1000);
    println!(
        "{:.2} ms total, population {}",
        start.elapsed().as_secs_f64() * 1000.0,
        engine.population()
    );

    Ok(())
}
