//! End-to-end tests for method advice.

mod common;

use std::sync::{Arc, Mutex};

use courier_advice::{Advisable, AdviceError, Advisor, advise, invoke};
use courier_events::{Publisher, Value, args, global};
use courier_test::{Recorder, failing_handler, test_channel};

use common::maths;

#[test]
fn before_advice_sees_args_and_object() {
    let math = maths();
    let publisher = Publisher::new();
    let recorder = Recorder::new();
    recorder.subscribe(&publisher, "before:pow");

    Advisor::with_publisher(&math, publisher)
        .before("pow", "before:pow")
        .unwrap();

    let out = invoke(&math, "pow", args![2.0_f64, 3.0_f64]).unwrap();
    assert_eq!(out.downcast_ref::<f64>(), Some(&8.0));

    let call = recorder.last().unwrap();
    assert_eq!(call.args.len(), 3);
    assert_eq!(call.args.get::<f64>(0), Some(&2.0));
    assert_eq!(call.args.get::<f64>(1), Some(&3.0));
    assert!(call.args.value(2).unwrap().points_to(&math));
}

#[test]
fn after_advice_sees_only_the_result_and_object() {
    let math = maths();
    let publisher = Publisher::new();
    let recorder = Recorder::new();
    recorder.subscribe(&publisher, "after:min");

    Advisor::with_publisher(&math, publisher)
        .after("min", "after:min")
        .unwrap();

    let out = invoke(&math, "min", args![1.0_f64, 10.0_f64, 20.0_f64]).unwrap();
    assert_eq!(out.downcast_ref::<f64>(), Some(&1.0));

    let call = recorder.last().unwrap();
    assert_eq!(call.args.len(), 2);
    assert_eq!(call.args.get::<f64>(0), Some(&1.0));
    assert!(call.args.value(1).unwrap().points_to(&math));
}

#[test]
fn before_advice_runs_before_the_body() {
    let math = maths();
    let publisher = Publisher::new();
    let observed = Arc::new(Mutex::new(Vec::new()));

    let log = Arc::clone(&observed);
    publisher.subscribe("before:max", move |_, _| {
        log.lock().unwrap().push("advice");
    });

    let log = Arc::clone(&observed);
    let original = math.methods().get("max").unwrap();
    math.methods().define("max", move |receiver, args| {
        log.lock().unwrap().push("body");
        original(receiver, args)
    });

    Advisor::with_publisher(&math, publisher)
        .before("max", "before:max")
        .unwrap();

    invoke(&math, "max", args![4.0_f64, 9.0_f64]).unwrap();
    assert_eq!(*observed.lock().unwrap(), vec!["advice", "body"]);
}

#[test]
fn registrations_accumulate_across_phases() {
    let math = maths();
    let publisher = Publisher::new();
    let recorder = Recorder::new();
    for channel in ["pow:1", "pow:2", "pow:done"] {
        recorder.subscribe(&publisher, channel);
    }

    let advisor = Advisor::with_publisher(&math, publisher);
    advisor
        .before_each([("pow", "pow:1"), ("pow", "pow:2")])
        .unwrap()
        .after("pow", "pow:done")
        .unwrap();

    invoke(&math, "pow", args![2.0_f64, 2.0_f64]).unwrap();
    invoke(&math, "pow", args![3.0_f64, 2.0_f64]).unwrap();

    assert_eq!(
        recorder.channels(),
        vec!["pow:1", "pow:2", "pow:done", "pow:1", "pow:2", "pow:done"]
    );
    let advised = advisor.advised_methods();
    assert_eq!(advised.len(), 1);
    assert_eq!(advised[0].before_channels(), vec!["pow:1", "pow:2"]);
    assert_eq!(advised[0].after_channels(), vec!["pow:done"]);
}

#[test]
fn advising_unknown_methods_is_rejected() {
    let math = maths();
    let advisor = Advisor::with_publisher(&math, Publisher::new());

    assert!(matches!(
        advisor.after("sqrt", "after:sqrt"),
        Err(AdviceError::UnknownMethod { .. })
    ));
    assert!(matches!(
        invoke(&math, "sqrt", args![4.0_f64]),
        Err(AdviceError::UnknownMethod { .. })
    ));
}

#[test]
fn failing_advice_handler_aborts_the_call() {
    let math = maths();
    let publisher = Publisher::new();
    let failing = failing_handler("not today");
    publisher.subscribe("before:pow", move |receiver, args| failing(receiver, args));

    Advisor::with_publisher(&math, publisher)
        .before("pow", "before:pow")
        .unwrap();

    let err = invoke(&math, "pow", args![2.0_f64, 3.0_f64]).unwrap_err();
    assert!(matches!(err, AdviceError::Publish(_)));
}

#[test]
fn default_advisor_publishes_on_the_global_publisher() {
    let math = maths();
    let before = test_channel("integration.before.pow");
    let after = test_channel("integration.after.min");
    let recorder = Recorder::new();
    let subscriptions = [
        recorder.subscribe(global(), &before),
        recorder.subscribe(global(), &after),
    ];

    advise(&math)
        .before("pow", &before)
        .unwrap()
        .after("min", &after)
        .unwrap();

    invoke(&math, "pow", args![2.0_f64, 3.0_f64]).unwrap();
    invoke(&math, "min", args![1.0_f64, 10.0_f64, 20.0_f64]).unwrap();

    for subscription in &subscriptions {
        subscription.detach();
    }

    let calls = recorder.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].args.len(), 3);
    assert_eq!(calls[1].args.get::<f64>(0), Some(&1.0));
}

#[test]
fn advice_channels_are_ordinary_channels() {
    let math = maths();
    let publisher = Publisher::new();
    let recorder = Recorder::new();
    recorder.subscribe(&publisher, "after:pow");

    Advisor::with_publisher(&math, publisher.clone())
        .after("pow", "after:pow")
        .unwrap();

    publisher
        .publish("after:pow", args![0.5_f64, "manual"])
        .unwrap();
    invoke(&math, "pow", args![4.0_f64, 0.5_f64]).unwrap();

    let results: Vec<f64> = recorder
        .calls()
        .iter()
        .map(|call| *call.args.get::<f64>(0).unwrap())
        .collect();
    assert_eq!(results, vec![0.5, 2.0]);
}

#[test]
fn calls_through_the_table_still_report_the_advised_object() {
    let math = maths();
    let publisher = Publisher::new();
    let recorder = Recorder::new();
    recorder.subscribe(&publisher, "before:pow");

    Advisor::with_publisher(&math, publisher)
        .before("pow", "before:pow")
        .unwrap();

    let out = math
        .methods()
        .call(&Value::new("stranger"), "pow", &args![2.0_f64, 3.0_f64])
        .unwrap();
    assert_eq!(out.downcast_ref::<f64>(), Some(&8.0));

    let call = recorder.last().unwrap();
    assert!(call.args.value(2).unwrap().points_to(&math));
    assert!(!call.args.value(2).unwrap().is::<&str>());
}
