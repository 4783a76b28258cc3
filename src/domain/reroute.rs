use serde::Serialize;

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RerouteCommand {
    Allocate {
        index: String,
        shard: u32,
        node: String,
    },
    Move {
        index: String,
        shard: u32,
        from_node: String,
        to_node: String,
    },
}

#[derive(Serialize, Debug)]
pub struct RerouteRequest<'a> {
    pub commands: &'a [RerouteCommand],
}
