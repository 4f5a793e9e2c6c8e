use abc_pool::{types::escape_string, AccessKind, Multiname, Namespace, NamespaceSet};
use insta::assert_snapshot;

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn escaping() {
    assert_eq!(escape_string("plain name"), "plain name");
    assert_eq!(escape_string("a\tb\nÿ"), "a\\tb\\n\\xc3\\xbf");
    assert_eq!(escape_string("\r"), "\\r");
    assert_eq!(escape_string("\u{1}x\u{8}"), "\\1x\\8");
    // control bytes past the decimal range print as two octal digits
    assert_eq!(escape_string("\u{b}\u{1f}"), "\\13\\37");
    assert_eq!(escape_string("\u{7f}"), "\\x7f");
}

#[test]
fn access_kind_bytes() {
    for (byte, label) in [
        (0x05, "private"),
        (0x08, "access08"),
        (0x16, "package"),
        (0x17, "packageinternal"),
        (0x18, "protected"),
        (0x19, "explicit"),
        (0x1a, "staticprotected"),
    ] {
        let kind = AccessKind::from(byte).unwrap();
        assert_eq!(kind as u8, byte);
        assert_eq!(kind.label(), label);
        assert_eq!(AccessKind::from_label(label), Some(kind));
    }
    assert_eq!(AccessKind::from(0x42), None);
    assert_eq!(AccessKind::from_label(""), Some(AccessKind::Package));
    assert_eq!(AccessKind::from_label("undefined"), Some(AccessKind::Access08));
    assert_eq!(AccessKind::from_label("bogus"), None);
}

#[test]
fn namespace_from_label_string() {
    init_logs();

    let ns = Namespace::from_label_string("[private]secret").unwrap();
    assert_eq!(ns, Namespace::private("secret"));

    let ns = Namespace::from_label_string("flash.display").unwrap();
    assert_eq!(ns, Namespace::package("flash.display"));

    let ns = Namespace::from_label_string("[]flash.display").unwrap();
    assert_eq!(ns, Namespace::package("flash.display"));

    let ns = Namespace::from_label_string("[undefined]x").unwrap();
    assert_eq!(ns.access, AccessKind::Access08);

    // unterminated bracket falls back to a package namespace
    let ns = Namespace::from_label_string("[oops").unwrap();
    assert_eq!(ns, Namespace::package("[oops"));

    assert_eq!(Namespace::from_label_string("[bogus]x"), None);
}

#[test]
fn multiname_from_string_forms() {
    init_logs();

    let qualified = Multiname::from_string("flash.display::Sprite");
    assert_eq!(
        qualified,
        Multiname::qname(Namespace::package("flash.display"), "Sprite")
    );

    let bare = Multiname::from_string("Sprite");
    assert_eq!(bare, Multiname::qname(Namespace::package(""), "Sprite"));

    let labeled = Multiname::from_string("[staticprotected]base::member");
    assert_eq!(
        labeled,
        Multiname::qname(Namespace::static_protected("base"), "member")
    );

    // a stray single ':' is reported but kept in the name
    let stray = Multiname::from_string("a:b");
    assert_eq!(stray, Multiname::qname(Namespace::package(""), "a:b"));

    // an unknown label leaves the namespace unresolved
    let unresolved = Multiname::from_string("[bogus]a::b");
    assert_eq!(
        unresolved,
        Multiname::QName {
            ns: None,
            name: Some("b".to_owned()),
        }
    );
}

#[test]
fn namespace_set_display() {
    let set = NamespaceSet::new(vec![Namespace::package("a"), Namespace::protected("b")]);
    assert_eq!(set.to_string(), "{[package]a,[protected]b}");
    assert_eq!(NamespaceSet::default().to_string(), "{}");
}

#[test]
fn display_forms() {
    let set = NamespaceSet::new(vec![Namespace::package("a"), Namespace::protected("b")]);
    let multinames = [
        Multiname::qname(Namespace::package("flash.display"), "Sprite"),
        Multiname::QNameA {
            ns: Some(Namespace::private("secret")),
            name: Some("x".to_owned()),
        },
        Multiname::QName { ns: None, name: None },
        Multiname::qname(Namespace::undefined("legacy"), "tab\there"),
        Multiname::RtQName {
            name: Some("later".to_owned()),
        },
        Multiname::RtQNameA { name: None },
        Multiname::RtQNameL,
        Multiname::RtQNameLA,
        Multiname::Multiname {
            name: Some("c".to_owned()),
            set: Some(set.clone()),
        },
        Multiname::MultinameA {
            name: None,
            set: Some(set.clone()),
        },
        Multiname::MultinameL { set: Some(set) },
        Multiname::MultinameLA { set: None },
        Multiname::Unknown(0xff),
    ];

    let rendered = multinames
        .iter()
        .map(|multiname| format!("{multiname}\n"))
        .collect::<String>();

    assert_snapshot!(rendered, @r###"
    <q>[package]flash.display::Sprite
    <q,attr>[private]secret::x
    <q>*::*
    <q>[access08]legacy::tab\there
    <rt>later
    <rt,attr>*
    <rt,l>
    <rt,l,attr>
    <multi>{[package]a,[protected]b}::c
    <multi,attr>{[package]a,[protected]b}::*
    <l,multi>{[package]a,[protected]b}
    <l,multi,attr>*
    --<MULTINAME ff>--
    "###);
}
