use std::collections::BTreeMap;

use serde::Serialize;

use crate::battle::{Outcome, RandomBattleRecord, TeamBattleRecord};

/// The six running counters shared by the per-tank and per-map buckets of
/// the random-battle report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BattleTotals {
    pub battles: u64,
    pub wins: u64,
    pub survived_count: u64,
    pub total_damage: i64,
    pub total_kills: i64,
    pub total_assisted: i64,
}

impl BattleTotals {
    fn record(&mut self, record: &RandomBattleRecord) {
        self.battles += 1;
        if record.outcome == Outcome::Win {
            self.wins += 1;
        }
        if record.survived {
            self.survived_count += 1;
        }
        self.total_damage += record.damage;
        self.total_kills += record.kills;
        self.total_assisted += record.assisted_damage;
    }

    fn absorb(&mut self, other: &BattleTotals) {
        self.battles += other.battles;
        self.wins += other.wins;
        self.survived_count += other.survived_count;
        self.total_damage += other.total_damage;
        self.total_kills += other.total_kills;
        self.total_assisted += other.total_assisted;
    }
}

/// Per-tank aggregate with a nested per-map breakdown.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TankStats {
    #[serde(flatten)]
    pub totals: BattleTotals,
    pub maps: BTreeMap<String, BattleTotals>,
}

/// Random-battle report: tank display name -> totals and map breakdown.
///
/// Keys are sorted so the serialized report is stable across runs.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct RandomBattleReport {
    pub tanks: BTreeMap<String, TankStats>,
}

impl RandomBattleReport {
    /// Folds one normalized record into the report. Buckets are created
    /// lazily on first occurrence of a tank or map name.
    pub fn add(&mut self, record: &RandomBattleRecord) {
        let tank = self.tanks.entry(record.tank.clone()).or_default();
        tank.totals.record(record);
        tank.maps
            .entry(record.map_name.clone())
            .or_default()
            .record(record);
    }

    /// Combines two independently computed reports. Merging is associative
    /// and commutative, so partial aggregates from parallel decodes can be
    /// folded in any order.
    pub fn merge(&mut self, other: RandomBattleReport) {
        for (name, stats) in other.tanks {
            let tank = self.tanks.entry(name).or_default();
            tank.totals.absorb(&stats.totals);
            for (map, totals) in stats.maps {
                tank.maps.entry(map).or_default().absorb(&totals);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tanks.is_empty()
    }
}

/// One line of a player's battle log in the team report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BattleDetail {
    pub map: String,
    pub tank: String,
    pub damage: i64,
    pub kills: i64,
    pub assisted_damage: i64,
}

/// Per-player aggregate: the full battle log plus running totals.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PlayerStats {
    pub battles: Vec<BattleDetail>,
    pub total_damage: i64,
    pub total_kills: i64,
    pub total_assisted: i64,
}

/// Per-map win/battle counters, accumulated once per replay regardless of
/// how many allies that replay contributed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MapRecord {
    pub wins: u64,
    pub battles: u64,
}

/// Team-battle report: per-player battle logs plus independent per-map
/// win rates.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TeamBattleReport {
    pub player_stats: BTreeMap<String, PlayerStats>,
    pub map_stats: BTreeMap<String, MapRecord>,
}

impl TeamBattleReport {
    pub fn add(&mut self, record: &TeamBattleRecord) {
        let map = self.map_stats.entry(record.map_name.clone()).or_default();
        map.battles += 1;
        if record.outcome == Outcome::Win {
            map.wins += 1;
        }

        for ally in &record.allies {
            let player = self.player_stats.entry(ally.name.clone()).or_default();
            player.battles.push(BattleDetail {
                map: record.map_name.clone(),
                tank: ally.tank.clone(),
                damage: ally.damage,
                kills: ally.kills,
                assisted_damage: ally.assisted_damage,
            });
            player.total_damage += ally.damage;
            player.total_kills += ally.kills;
            player.total_assisted += ally.assisted_damage;
        }
    }

    /// Associative merge: counters are summed, battle logs concatenated,
    /// key sets unioned.
    pub fn merge(&mut self, other: TeamBattleReport) {
        for (name, stats) in other.player_stats {
            let player = self.player_stats.entry(name).or_default();
            player.battles.extend(stats.battles);
            player.total_damage += stats.total_damage;
            player.total_kills += stats.total_kills;
            player.total_assisted += stats.total_assisted;
        }
        for (map, record) in other.map_stats {
            let entry = self.map_stats.entry(map).or_default();
            entry.wins += record.wins;
            entry.battles += record.battles;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.player_stats.is_empty() && self.map_stats.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::AllyStats;

    fn random_record(
        tank: &str,
        map: &str,
        outcome: Outcome,
        damage: i64,
        kills: i64,
        survived: bool,
    ) -> RandomBattleRecord {
        RandomBattleRecord {
            map_name: map.to_string(),
            tank: tank.to_string(),
            damage,
            kills,
            assisted_damage: 0,
            survived,
            outcome,
        }
    }

    #[test]
    fn two_battles_same_tank_same_map() {
        let mut report = RandomBattleReport::default();
        report.add(&random_record("T1", "Himmelsdorf", Outcome::Win, 2000, 1, true));
        report.add(&random_record("T1", "Himmelsdorf", Outcome::Loss, 1000, 0, false));

        let tank = &report.tanks["T1"];
        let expected = BattleTotals {
            battles: 2,
            wins: 1,
            survived_count: 1,
            total_damage: 3000,
            total_kills: 1,
            total_assisted: 0,
        };
        assert_eq!(tank.totals, expected);
        assert_eq!(tank.maps.len(), 1);
        assert_eq!(tank.maps["Himmelsdorf"], expected);
    }

    #[test]
    fn draws_count_battles_but_not_wins() {
        let mut report = RandomBattleReport::default();
        report.add(&random_record("T1", "Malinovka", Outcome::Draw, 500, 0, true));
        assert_eq!(report.tanks["T1"].totals.battles, 1);
        assert_eq!(report.tanks["T1"].totals.wins, 0);
    }

    #[test]
    fn map_battles_sum_to_tank_battles() {
        let mut report = RandomBattleReport::default();
        report.add(&random_record("T1", "Himmelsdorf", Outcome::Win, 100, 0, false));
        report.add(&random_record("T1", "Malinovka", Outcome::Loss, 100, 0, false));
        report.add(&random_record("T1", "Malinovka", Outcome::Win, 100, 1, true));
        report.add(&random_record("T2", "Himmelsdorf", Outcome::Win, 100, 0, false));

        for tank in report.tanks.values() {
            let map_sum: u64 = tank.maps.values().map(|m| m.battles).sum();
            assert_eq!(map_sum, tank.totals.battles);
        }
    }

    #[test]
    fn merge_equals_single_batch() {
        let a = random_record("T1", "Himmelsdorf", Outcome::Win, 2000, 1, true);
        let b = random_record("T1", "Himmelsdorf", Outcome::Loss, 1000, 0, false);

        let mut combined = RandomBattleReport::default();
        combined.add(&a);
        combined.add(&b);

        let mut left = RandomBattleReport::default();
        left.add(&a);
        let mut right = RandomBattleReport::default();
        right.add(&b);
        left.merge(right);

        assert_eq!(left.tanks["T1"].totals, combined.tanks["T1"].totals);
        assert_eq!(
            left.tanks["T1"].maps["Himmelsdorf"],
            combined.tanks["T1"].maps["Himmelsdorf"]
        );
    }

    fn team_record(map: &str, outcome: Outcome, allies: Vec<AllyStats>) -> TeamBattleRecord {
        TeamBattleRecord {
            map_name: map.to_string(),
            outcome,
            allies,
        }
    }

    fn ally(name: &str, damage: i64) -> AllyStats {
        AllyStats {
            name: name.to_string(),
            tank: "R04_T-34".to_string(),
            damage,
            kills: 0,
            assisted_damage: 0,
        }
    }

    #[test]
    fn map_battles_counted_once_per_replay() {
        let mut report = TeamBattleReport::default();
        report.add(&team_record(
            "Prokhorovka",
            Outcome::Win,
            vec![ally("A", 100), ally("B", 200), ally("C", 300)],
        ));
        report.add(&team_record("Prokhorovka", Outcome::Loss, vec![ally("A", 50)]));

        assert_eq!(report.map_stats["Prokhorovka"], MapRecord { wins: 1, battles: 2 });
        assert_eq!(report.player_stats["A"].battles.len(), 2);
        assert_eq!(report.player_stats["A"].total_damage, 150);
        assert_eq!(report.player_stats["B"].total_damage, 200);
    }

    #[test]
    fn team_merge_concatenates_battle_logs() {
        let mut left = TeamBattleReport::default();
        left.add(&team_record("Prokhorovka", Outcome::Win, vec![ally("A", 100)]));
        let mut right = TeamBattleReport::default();
        right.add(&team_record("Himmelsdorf", Outcome::Loss, vec![ally("A", 200)]));

        left.merge(right);

        assert_eq!(left.player_stats["A"].battles.len(), 2);
        assert_eq!(left.player_stats["A"].total_damage, 300);
        assert_eq!(left.map_stats.len(), 2);
    }

    #[test]
    fn empty_report_serializes_to_empty_maps() {
        let report = TeamBattleReport::default();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"player_stats": {}, "map_stats": {}})
        );

        let report = RandomBattleReport::default();
        assert_eq!(serde_json::to_value(&report).unwrap(), serde_json::json!({}));
    }
}
