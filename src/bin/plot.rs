use anyhow::Result;

use pulsegraph::config::PlotConfig;
use pulsegraph::render::plot_table;
use pulsegraph::sampler::{sample, FunctionKind, PlotDomain, PlotFunction};

fn main() -> Result<()> {
    let cfg = PlotConfig::from_env();
    let kind = FunctionKind::from_name(&cfg.function)?;
    let function = PlotFunction {
        kind,
        amplitude: cfg.amplitude,
        frequency: cfg.frequency,
    };
    let domain = PlotDomain::new(cfg.start, cfg.end, cfg.points)?;

    eprintln!(
        "[plot] y = {} * {} over [{}, {}] ({} points, step {:.6})",
        function.amplitude,
        kind.label().replace('x', &format!("({}x)", function.frequency)),
        domain.start,
        domain.end,
        domain.points,
        domain.step()
    );
    print!("{}", plot_table(&sample(&function, &domain, cfg.derivative)));
    Ok(())
}
