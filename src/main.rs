// src/main.rs
//
// Research-harness CLI for the routina decision core.
//
// Runs seeded episodes over the demo store with a uniform policy, prints a
// concise run header and per-episode summary, and optionally writes per-step
// telemetry as JSONL. Deterministic given --seed.

use anyhow::Context;
use clap::{ArgAction, Parser};

use routina::config::Config;
use routina::decision::DecisionLoop;
use routina::env::ActivityEnv;
use routina::policy::{Policy, UniformPolicy};
use routina::scorer::FeedbackModel;
use routina::store::{CoinFlip, MemoryStore};
use routina::telemetry::{FileSink, NoopSink, StepSink};

#[derive(Debug, Parser)]
#[command(
    name = "routina",
    about = "Daily-activity decision loop (research harness)",
    version
)]
struct Args {
    /// Number of episodes to run.
    #[arg(long, default_value_t = 5)]
    episodes: u64,

    /// Deterministic seed for day-end, policy and replay sampling.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Replay buffer capacity.
    #[arg(long, default_value_t = 1000)]
    capacity: usize,

    /// Suggest-plan demo place (omit to skip the plan demo).
    #[arg(long)]
    plan_place: Option<String>,

    /// Write per-step telemetry to this JSONL file.
    #[arg(long)]
    telemetry: Option<String>,

    /// Verbosity: -v, -vv
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut cfg = Config::default();
    cfg.replay.capacity = args.capacity;

    let store = MemoryStore::with_sample_data()
        .with_day_end(Box::new(CoinFlip::seeded(args.seed)));
    let mut env = ActivityEnv::with_seed(store, &cfg, args.seed)
        .context("constructing environment")?;
    let mut policy = UniformPolicy::seeded(args.seed);

    let mut sink: Box<dyn StepSink> = match &args.telemetry {
        Some(path) => Box::new(FileSink::create(path).context("creating telemetry sink")?),
        None => Box::new(NoopSink),
    };

    println!(
        "routina run: episodes={} seed={} capacity={} locations={}",
        args.episodes,
        args.seed,
        args.capacity,
        env.encoder().locations().len()
    );

    let mut total_reward = 0.0;
    for episode in 0..args.episodes {
        policy.reset_episode(args.seed.wrapping_add(episode));
        let mut obs = env.reset().context("resetting environment")?;

        let mut episode_reward = 0.0;
        let mut steps = 0u64;
        for tick in 1..=cfg.max_steps_per_episode as u64 {
            if env.action_space_len() == 0 {
                if args.verbose > 0 {
                    println!(
                        "  episode {}: no activities at '{}', ending early",
                        episode,
                        env.current_location()
                    );
                }
                break;
            }
            let action = policy.select(&obs, env.action_space_len()) % env.action_space_len();
            let result = env.step(action)?;
            sink.log_step(episode, tick, &result);

            episode_reward += result.reward;
            steps = tick;
            obs = result.observation;
            if args.verbose > 1 {
                println!(
                    "  episode {} tick {}: action={} reward={:+.0} state={:?} loc='{}'",
                    episode, tick, action, result.reward, result.info.state, result.info.location
                );
            }
            if result.done {
                break;
            }
        }

        total_reward += episode_reward;
        println!(
            "episode {}: steps={} reward={:+.0} buffer={}",
            episode,
            steps,
            episode_reward,
            env.buffer().len()
        );
    }

    println!(
        "total reward {:+.0} over {} episodes; buffer holds {} transitions",
        total_reward,
        args.episodes,
        env.buffer().len()
    );

    // Retrain on the history accumulated above and demo the recommend path.
    let locations = env.encoder().locations().clone();
    let model = FeedbackModel::fit_from_store(env.store(), &locations)
        .context("retraining feedback model")?;

    if let Some(place) = &args.plan_place {
        let mut decision = DecisionLoop::new(&mut env, &mut policy, cfg.plan_horizon)
            .with_model(&model);
        let rec = decision.recommend_one(place, "STILL")?;
        println!(
            "recommend at '{}': {} (id {}, refinement {:?})",
            place, rec.activity_name, rec.activity_id, rec.refinement
        );
        let plan = decision.suggest_plan(place, "STILL")?;
        println!("plan for '{}': {}", place, plan.join(", "));
    }

    Ok(())
}
