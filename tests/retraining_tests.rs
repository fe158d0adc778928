// tests/retraining_tests.rs
//
// Retraining consumes the history the decision loop accumulates: actions
// from recommend-one, feedback records from environment steps, joined by
// the store.

use routina::config::Config;
use routina::decision::DecisionLoop;
use routina::env::ActivityEnv;
use routina::error::CoreError;
use routina::policy::FixedPolicy;
use routina::scorer::FeedbackModel;
use routina::store::{MemoryStore, NeverEnds};

#[test]
fn model_fits_on_accumulated_history() {
    let store = MemoryStore::with_sample_data().with_day_end(Box::new(NeverEnds));
    let mut env = ActivityEnv::new(store, &Config::deterministic()).unwrap();
    let mut policy = FixedPolicy::new(0);

    {
        let mut decision = DecisionLoop::new(&mut env, &mut policy, 10);
        for _ in 0..3 {
            decision.recommend_one("Park", "STILL").unwrap();
        }
    }
    env.reset().unwrap();
    env.step(0).unwrap();

    let locations = env.encoder().locations().clone();
    let model = FeedbackModel::fit_from_store(env.store(), &locations).unwrap();

    // Park / action 0 has accepted history ("Yes" feedback on activity 1).
    assert_eq!(model.predict_place("Park", 0).unwrap(), "Yes");
}

#[test]
fn retraining_on_an_empty_store_is_fatal() {
    let store = MemoryStore::new(vec![]);
    let locations = routina::env::Vocab::new(Vec::<String>::new());
    let err = FeedbackModel::fit_from_store(&store, &locations).unwrap_err();
    assert!(matches!(err, CoreError::InvalidArgument { .. }));
}
