/// Legacy wire tags accepted on read. Writers always emit the canonical
/// tag; readers map an alias to its canonical form before dispatch.
pub(crate) fn condition_alias(tag: &str) -> Option<&'static str> {
    match tag {
        "Search" => Some("StringContains"),
        "RawSearch" => Some("RawStringContains"),
        _ => None,
    }
}

pub(crate) fn modification_alias(tag: &str) -> Option<&'static str> {
    match tag {
        "AppendList" => Some("ListAppend"),
        "AppendSet" => Some("SetAppend"),
        _ => None,
    }
}
