use clap::Parser;
use log::info;
use simplelog::LevelFilter;

use aomdd_rs::assignment::Assignment;
use aomdd_rs::manager::NodeManager;
use aomdd_rs::pseudo_tree::ParentTree;
use aomdd_rs::scope::Scope;
use aomdd_rs::types::Var;

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Number of variables in the chain.
    #[arg(long, value_name = "INT", default_value = "6")]
    vars: usize,

    /// Cardinality of every variable.
    #[arg(long, value_name = "INT", default_value = "3")]
    card: usize,

    /// Log level.
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    log_level: LevelFilter,

    /// Print the final diagram in DOT format.
    #[arg(long)]
    dot: bool,
}

/// Pairwise factor between neighbours `i` and `i + 1`.
fn factor(i: usize, card: usize) -> Vec<f64> {
    let mut values = Vec::with_capacity(card * card);
    for a in 0..card {
        for b in 0..card {
            values.push(1.0 + ((i + 2 * a + 3 * b) % 5) as f64);
        }
    }
    let total: f64 = values.iter().sum();
    values.into_iter().map(|v| v / total).collect()
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Cli::parse();

    simplelog::TermLogger::init(
        args.log_level,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let time_total = std::time::Instant::now();
    println!("args = {:?}", args);
    assert!(args.vars >= 2, "Need at least two variables");

    let vars: Vec<Var> = (0..args.vars as u32).map(Var::new).collect();
    let pt = ParentTree::chain(&vars);
    let mgr = NodeManager::default();
    println!("mgr = {:?}", mgr);

    // Lower every factor and multiply them along the chain.
    let mut root = None;
    for i in 0..args.vars - 1 {
        let scope = Scope::from_iter([(vars[i], args.card), (vars[i + 1], args.card)]);
        let f = mgr.create_from_table(&scope, &factor(i, args.card), 1.0);
        info!("factor #{} over {}: {} nodes", i, scope, mgr.num_unique_nodes(f));
        root = Some(match root {
            None => f,
            Some(r) => mgr.apply_product(r, f, &pt),
        });
    }
    let Some(joint) = root else {
        return Ok(());
    };

    let full: Scope = vars.iter().map(|&v| (v, args.card)).collect();
    println!("joint:\n{}", mgr.stats(joint, &full));

    // Partition function, both ways.
    let z = mgr.sum(joint, &Assignment::new(Scope::new()));
    println!("Z (sum query) = {}", z);

    let eliminated = mgr.marginalize(joint, &full.difference(&Scope::single(vars[0], args.card)), &pt);
    let (roots, weight) = mgr.full_reduce(eliminated);
    println!("marginal of {}: roots = {:?}, weight = {}", vars[0], roots, weight);

    let mut a = Assignment::first(Scope::single(vars[0], args.card));
    let mut z_marginal = 0.0;
    loop {
        let p: f64 = roots.iter().map(|&r| mgr.evaluate(r, &a)).product::<f64>() * weight;
        println!("  P{} = {:.6}", a, p / z);
        z_marginal += p;
        if !a.iterate() {
            break;
        }
    }
    println!("Z (marginal) = {}", z_marginal);

    let (hits, misses, size) = mgr.cache_stats();
    println!("cache: hits = {}, misses = {}, size = {}", hits, misses, size);
    println!("unique table: {} nodes", mgr.num_nodes());

    if args.dot {
        println!("{}", mgr.to_dot(&roots)?);
    }

    println!("\nAll done in {:.3} s", time_total.elapsed().as_secs_f64());
    Ok(())
}
