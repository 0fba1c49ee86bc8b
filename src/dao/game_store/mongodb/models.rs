use indexmap::IndexSet;
use mongodb::bson::{Bson, DateTime, Document, doc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{MongoDaoError, MongoResult};
use crate::{
    dao::models::{GameEntity, GameResultEntity, GameStatusEntity, MoveEntity, UserEntity},
    state::board::{Cell, Symbol},
};

/// Identifiers are stored as hyphenated strings so documents stay readable
/// from the mongo shell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoGameDocument {
    #[serde(rename = "_id")]
    id: String,
    player_x: String,
    player_o: String,
    board: [[Cell; 3]; 3],
    #[serde(default)]
    moves: Vec<MongoMoveDocument>,
    status: GameStatusEntity,
    current_turn: String,
    #[serde(default)]
    result: Option<MongoResultDocument>,
    created_at: DateTime,
    updated_at: DateTime,
    #[serde(default)]
    version: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct MongoMoveDocument {
    row: i32,
    col: i32,
    symbol: Symbol,
    user_id: String,
    ts: DateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum MongoResultDocument {
    Win { winner: String, symbol: Symbol },
    Draw,
}

/// User as stored in the `users` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoUserDocument {
    #[serde(rename = "_id")]
    id: String,
    username: String,
    password: String,
    #[serde(default)]
    wins: Vec<String>,
    #[serde(default)]
    losses: Vec<String>,
    #[serde(default)]
    draws: Vec<String>,
    created_at: DateTime,
}

impl From<GameEntity> for MongoGameDocument {
    fn from(value: GameEntity) -> Self {
        Self {
            id: value.id.to_string(),
            player_x: value.player_x.to_string(),
            player_o: value.player_o.to_string(),
            board: value.board,
            moves: value
                .moves
                .into_iter()
                .map(|mv| MongoMoveDocument {
                    row: i32::from(mv.row),
                    col: i32::from(mv.col),
                    symbol: mv.symbol,
                    user_id: mv.user_id.to_string(),
                    ts: DateTime::from_system_time(mv.played_at),
                })
                .collect(),
            status: value.status,
            current_turn: value.current_turn.to_string(),
            result: value.result.map(|result| match result {
                GameResultEntity::Win { winner, symbol } => MongoResultDocument::Win {
                    winner: winner.to_string(),
                    symbol,
                },
                GameResultEntity::Draw => MongoResultDocument::Draw,
            }),
            created_at: DateTime::from_system_time(value.created_at),
            updated_at: DateTime::from_system_time(value.updated_at),
            version: version_to_bson(value.version),
        }
    }
}

impl TryFrom<MongoGameDocument> for GameEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoGameDocument) -> MongoResult<Self> {
        let moves = value
            .moves
            .into_iter()
            .map(|mv| {
                Ok(MoveEntity {
                    row: coordinate(mv.row, "moves.row")?,
                    col: coordinate(mv.col, "moves.col")?,
                    symbol: mv.symbol,
                    user_id: parse_id("game", "moves.user_id", &mv.user_id)?,
                    played_at: mv.ts.to_system_time(),
                })
            })
            .collect::<MongoResult<Vec<_>>>()?;

        let result = match value.result {
            Some(MongoResultDocument::Win { winner, symbol }) => Some(GameResultEntity::Win {
                winner: parse_id("game", "result.winner", &winner)?,
                symbol,
            }),
            Some(MongoResultDocument::Draw) => Some(GameResultEntity::Draw),
            None => None,
        };

        Ok(Self {
            id: parse_id("game", "_id", &value.id)?,
            player_x: parse_id("game", "player_x", &value.player_x)?,
            player_o: parse_id("game", "player_o", &value.player_o)?,
            board: value.board,
            moves,
            status: value.status,
            current_turn: parse_id("game", "current_turn", &value.current_turn)?,
            result,
            created_at: value.created_at.to_system_time(),
            updated_at: value.updated_at.to_system_time(),
            version: u64::try_from(value.version).map_err(|_| {
                MongoDaoError::MalformedDocument {
                    entity: "game",
                    field: "version",
                    value: value.version.to_string(),
                }
            })?,
        })
    }
}

impl From<UserEntity> for MongoUserDocument {
    fn from(value: UserEntity) -> Self {
        let ids = |set: IndexSet<Uuid>| -> Vec<String> { set.iter().map(Uuid::to_string).collect() };
        Self {
            id: value.id.to_string(),
            username: value.username,
            password: value.password,
            wins: ids(value.wins),
            losses: ids(value.losses),
            draws: ids(value.draws),
            created_at: DateTime::from_system_time(value.created_at),
        }
    }
}

impl TryFrom<MongoUserDocument> for UserEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoUserDocument) -> MongoResult<Self> {
        let ids = |field: &'static str, raw: Vec<String>| -> MongoResult<IndexSet<Uuid>> {
            raw.iter()
                .map(|id| parse_id("user", field, id))
                .collect()
        };
        Ok(Self {
            id: parse_id("user", "_id", &value.id)?,
            username: value.username,
            password: value.password,
            wins: ids("wins", value.wins)?,
            losses: ids("losses", value.losses)?,
            draws: ids("draws", value.draws)?,
            created_at: value.created_at.to_system_time(),
        })
    }
}

/// `{_id: "<uuid>"}` filter.
pub fn doc_id(id: Uuid) -> Document {
    doc! {"_id": id.to_string()}
}

/// BSON has no unsigned 64-bit integer; versions saturate at `i64::MAX`.
pub fn version_to_bson(version: u64) -> i64 {
    i64::try_from(version).unwrap_or(i64::MAX)
}

/// Filter matching the game only while it is still at `expected_version`.
///
/// Documents written before versioning carry no `version` field and load as
/// version 0, so the first save against them must accept a missing field too.
pub fn version_filter(id: Uuid, expected_version: u64) -> Document {
    let mut filter = doc_id(id);
    if expected_version == 0 {
        filter.insert("version", doc! {"$in": [0_i64, Bson::Null]});
    } else {
        filter.insert("version", version_to_bson(expected_version));
    }
    filter
}

fn parse_id(entity: &'static str, field: &'static str, raw: &str) -> MongoResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| MongoDaoError::MalformedDocument {
        entity,
        field,
        value: raw.to_owned(),
    })
}

fn coordinate(raw: i32, field: &'static str) -> MongoResult<u8> {
    u8::try_from(raw)
        .ok()
        .filter(|value| *value < 3)
        .ok_or(MongoDaoError::MalformedDocument {
            entity: "game",
            field,
            value: raw.to_string(),
        })
}
