pub mod rotation_json;

pub use rotation_json::{
    apply_edit_json, keeper_counts_json, playtime_json, rank_json, season_playtime_json,
    validate_json, EditRequest, EditResponse, KeeperCountsRequest, KeeperCountsResponse,
    PlaytimeRequest, PlaytimeResponse, RankRequest, RankResponse, SeasonRequest, SeasonResponse,
    ValidateRequest, ValidateResponse,
};
