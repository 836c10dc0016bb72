use tcp_sweep::targets::{expand_target, expand_targets};

#[test]
fn cidr_expands_to_hosts() {
    assert_eq!(
        expand_target("10.0.0.0/30").unwrap(),
        vec!["10.0.0.1", "10.0.0.2"]
    );
}

#[test]
fn mixed_arguments_keep_order() {
    let got = expand_targets(&["scanme.example", "10.0.0.0/30,127.0.0.1"]).unwrap();
    assert_eq!(
        got,
        vec!["scanme.example", "10.0.0.1", "10.0.0.2", "127.0.0.1"]
    );
}

#[test]
fn invalid_cidr_is_an_error() {
    assert!(expand_targets(&["10.0.0.0/33"]).is_err());
}

#[test]
fn whole_address_space_is_refused() {
    assert!(expand_target("0.0.0.0/0").is_err());
    assert!(expand_targets(&["127.0.0.1", "0.0.0.0/0"]).is_err());
}
