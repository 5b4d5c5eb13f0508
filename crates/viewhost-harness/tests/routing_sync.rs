#![forbid(unsafe_code)]

//! Integration tests: router/native synchronization edge cases.

use std::cell::RefCell;
use std::rc::Rc;

use viewhost_core::{Contract, ViewError, ViewLocator, ViewRegistrations};
use viewhost_harness::{
    NavOp, OtherViewModel, ProbeViewModel, RecordingNavigation, element, init_test_logging, page,
};
use viewhost_reactive::Observable;
use viewhost_widgets::{RoutedViewHost, RoutingState};

fn locator() -> ViewLocator {
    let mut regs = ViewRegistrations::new();
    regs.register::<ProbeViewModel>(Contract::none(), page::<ProbeViewModel>)
        .register::<OtherViewModel>(Contract::none(), element::<OtherViewModel>);
    ViewLocator::new(regs)
}

#[test]
fn navigate_and_reset_with_retained_root() {
    init_test_logging();
    let router = RoutingState::new();
    let nav = RecordingNavigation::keeping_root();
    let host = RoutedViewHost::new(router.clone(), nav.clone(), locator());
    let _active = host.activate().unwrap();

    router.navigate(ProbeViewModel::shared("root"));
    router.navigate(ProbeViewModel::shared("a"));
    router.navigate_and_reset(ProbeViewModel::shared("fresh"));

    assert_eq!(router.len(), 1);
    assert_eq!(
        nav.titles(),
        vec![Some("root".to_string()), Some("fresh".to_string())]
    );
    assert_eq!(nav.programmatic_pops(), 1, "one pop_to_root, nothing else");
}

#[test]
fn push_errors_reach_thrown_errors_subscribers() {
    let router = RoutingState::new();
    let nav = RecordingNavigation::new();
    let host = RoutedViewHost::new(router.clone(), nav.clone(), locator());
    let _active = host.activate().unwrap();

    let errors = Rc::new(RefCell::new(Vec::new()));
    let e = Rc::clone(&errors);
    let _sub = host
        .thrown_errors()
        .subscribe(move |err| e.borrow_mut().push(err.clone()));

    router.navigate(ProbeViewModel::shared("ok"));
    router.navigate(viewhost_core::ViewModelRef::new(OtherViewModel));

    assert_eq!(errors.borrow().len(), 1);
    assert!(matches!(
        errors.borrow()[0],
        ViewError::ViewTypeMismatch { .. }
    ));
    assert_eq!(router.len(), 1);
    assert_eq!(nav.views().len(), 1);
}

#[test]
fn inactive_host_does_not_follow_user_pops() {
    let router = RoutingState::new();
    let nav = RecordingNavigation::new();
    let host = RoutedViewHost::new(router.clone(), nav.clone(), locator());
    let active = host.activate().unwrap();
    router.navigate(ProbeViewModel::shared("a"));
    router.navigate(ProbeViewModel::shared("b"));
    drop(active);

    nav.user_pop();
    assert_eq!(router.len(), 2);
    assert_eq!(nav.views().len(), 1);
}

#[test]
fn reactivation_skips_sync_when_native_stack_is_populated() {
    let router = RoutingState::new();
    let nav = RecordingNavigation::new();
    let host = RoutedViewHost::new(router.clone(), nav.clone(), locator());

    let active = host.activate().unwrap();
    router.navigate(ProbeViewModel::shared("a"));
    active.release().unwrap();

    let _again = host.activate().unwrap();
    assert_eq!(nav.views().len(), 1);
    assert_eq!(
        nav.ops()
            .iter()
            .filter(|op| matches!(op, NavOp::Push { .. }))
            .count(),
        1
    );
}

#[test]
fn contract_source_selects_page_variant() {
    let mut regs = ViewRegistrations::new();
    regs.register::<ProbeViewModel>(Contract::none(), page::<ProbeViewModel>)
        .register::<ProbeViewModel>("tablet", element::<ProbeViewModel>);
    let router = RoutingState::new();
    let nav = RecordingNavigation::new();
    let host = RoutedViewHost::new(router.clone(), nav.clone(), ViewLocator::new(regs));
    let contract = Observable::new(Contract::none());
    host.set_contract(&contract);
    let _active = host.activate().unwrap();

    router.navigate(ProbeViewModel::shared("phone"));
    assert_eq!(nav.views().len(), 1);

    contract.set(Contract::new("tablet"));
    router.navigate(ProbeViewModel::shared("tablet"));
    assert_eq!(nav.views().len(), 1, "tablet registration is not a page");
    assert!(matches!(
        host.take_error(),
        Some(ViewError::ViewTypeMismatch { .. })
    ));
}
