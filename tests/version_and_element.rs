use proptest::prelude::*;

use arbook::{
    element::{AttribLookup, Element},
    types::Version,
};

proptest! {
    #[test]
    fn version_order_is_component_order(
        a in 0u16..64, b in 0u16..256, c in 0u16..64, d in 0u16..256,
    ) {
        let left = Version::new(a, b);
        let right = Version::new(c, d);
        prop_assert_eq!(left.cmp(&right), (a, b).cmp(&(c, d)));
        prop_assert_eq!(Version::parse(&left.to_string()), left);
        prop_assert_eq!(Version::parse_strict(&left.to_string()), Some(left));
    }

    #[test]
    fn oversized_minor_stays_below_next_major(major in 0u16..64, minor in any::<u16>()) {
        let version = Version::parse(&format!("{major}.{minor}"));
        prop_assert_eq!(version.major(), major);
        prop_assert!(version < Version::new(major + 1, 0));
        prop_assert_eq!(Version::parse_strict(&format!("{major}.{minor}")).is_some(), minor < 256);
    }

    #[test]
    fn attributes_survive_xml(
        text in "[a-zA-Z0-9 &<>'\"]{0,20}",
        number in any::<i32>(),
        flag in any::<bool>(),
        body in "[ a-zA-Z0-9&<>\t\n]{1,20}",
    ) {
        let mut root = Element::new("Root");
        let child = root.add_element("Child");
        child.add_attrib("Text", &text);
        child.add_attrib("Number", number);
        child.add_attrib("Flag", flag);
        child.set_value(body.clone());

        let xml = root.to_xml_string().expect("write");
        let back = Element::from_xml_str(&xml).expect("read");
        let child = back.find_child("Child").expect("child");
        prop_assert_eq!(child.attrib::<String>("Text").found(), Some(text));
        prop_assert_eq!(child.attrib::<i32>("Number").found(), Some(number));
        prop_assert_eq!(child.attrib::<bool>("Flag").found(), Some(flag));
        prop_assert_eq!(child.value(), body.as_str());
    }
}

#[test]
fn lenient_version_parsing() {
    assert_eq!(Version::parse("12"), Version::new(12, 0));
    assert_eq!(Version::parse("8.10b"), Version::new(8, 10));
    assert_eq!(Version::parse("junk"), Version::new(0, 0));
    assert!(Version::new(2, 5) < Version::new(2, 10));
}

#[test]
fn typed_lookup_distinguishes_missing_from_invalid() {
    let mut el = Element::new("Run");
    el.add_attrib("Place", "first");
    assert!(matches!(el.attrib::<i16>("Place"), AttribLookup::Invalid));
    assert!(matches!(el.attrib::<i16>("InClass"), AttribLookup::NotFound));
    el.add_attrib("Place", 2i16);
    assert_eq!(el.attrib::<i16>("Place").found(), Some(2));
}
