//! Reachability for an n-bit counter that wraps around at a limit.
//!
//! Run with:
//! ```bash
//! cargo run --example counter -- --bits 6 --limit 40
//! ```

use clap::Parser;
use robdd::bdd::Bdd;
use robdd::reference::Ref;
use robdd::types::Var;

#[derive(Parser, Debug)]
#[command(author, version, about = "Symbolic reachability of a wrapping counter")]
struct Cli {
    /// Number of counter bits.
    #[arg(short, long, default_value_t = 4)]
    bits: u32,

    /// The counter goes back to 0 after reaching this value.
    #[arg(short, long)]
    limit: Option<u64>,

    /// Initial node table size (log2).
    #[arg(long, default_value_t = 16)]
    storage_bits: usize,

    /// Print debug logs.
    #[arg(short, long)]
    verbose: bool,
}

/// Counter value `n` over current-state variables.
fn value(bdd: &Bdd, bits: u32, n: u64) -> Ref {
    bdd.apply_and_many((0..bits).map(|i| {
        let v = Var::current(i + 1).id();
        if (n >> i) & 1 == 1 {
            bdd.mk_var(v)
        } else {
            bdd.mk_nvar(v)
        }
    }))
}

/// Transition relation `x' = x + 1`, over interleaved current/next bits.
fn increment(bdd: &Bdd, bits: u32) -> Ref {
    let mut carry = Ref::TRUE;
    let mut parts = Vec::new();
    for i in 0..bits {
        let x = bdd.mk_var(Var::current(i + 1).id());
        let y = bdd.mk_var(Var::next(i + 1).id());
        parts.push(bdd.apply_eq(y, bdd.apply_xor(x, carry)));
        carry = bdd.apply_and(x, carry);
    }
    bdd.apply_and_many(parts)
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Cli::parse();

    simplelog::TermLogger::init(
        if args.verbose {
            simplelog::LevelFilter::Debug
        } else {
            simplelog::LevelFilter::Info
        },
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    if args.bits == 0 || args.bits > 32 {
        color_eyre::eyre::bail!("--bits must be in 1..=32, got {}", args.bits);
    }
    let max = (1u64 << args.bits) - 1;
    let limit = args.limit.unwrap_or(max);
    if limit > max {
        color_eyre::eyre::bail!("--limit {} does not fit into {} bits", limit, args.bits);
    }

    let bdd = Bdd::new(args.storage_bits);
    println!("bdd = {:?}", bdd);

    // Count up below the limit, wrap to zero at the limit.
    let at_limit = value(&bdd, args.bits, limit);
    let zero_next = bdd.next(value(&bdd, args.bits, 0));
    let trans = bdd.apply_or(
        bdd.apply_and(bdd.apply_not(at_limit), increment(&bdd, args.bits)),
        bdd.apply_and(at_limit, zero_next),
    );

    let current_vars: Vec<u32> = (1..=args.bits).map(|k| Var::current(k).id()).collect();
    let image = |from: Ref| {
        let step = bdd.apply_and(from, trans);
        bdd.prev(bdd.exists_many(step, current_vars.iter().copied()))
    };

    let mut reached = value(&bdd, args.bits, 0);
    let mut steps = 0;
    loop {
        let new_reached = bdd.apply_or(reached, image(reached));
        if new_reached == reached {
            break;
        }
        reached = new_reached;
        steps += 1;
    }
    println!("fixpoint after {} steps", steps);

    for n in (0..=max.min(limit + 1)).take(4096) {
        let state = value(&bdd, args.bits, n);
        let expected = n <= limit;
        assert_eq!(bdd.contains(reached, state), expected);
        assert_eq!(bdd.intersects(reached, state), expected);
    }
    println!("reachable = [0, {}]", limit);
    if args.bits <= 3 {
        println!("reachable = {}", bdd.to_bracket_string(reached));
    }

    println!("bdd = {:?}", bdd);
    println!(
        "cache: {} hits, {} misses",
        bdd.cache().hits(),
        bdd.cache().misses()
    );

    Ok(())
}
