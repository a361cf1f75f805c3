use guild_tournament_bot::{
    assign_teams, declare_winner, join_pool, start_bracket, start_registration, ParticipantId,
    RandomOrder, SoloProgress, Tournament, TournamentRecord,
};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeSet;

proptest! {
    #[test]
    fn seeding_uses_every_player_once(
        seed in any::<u64>(),
        size in prop::sample::select(vec![4usize, 8, 16]),
    ) {
        let ids: Vec<ParticipantId> = (1..=size as u64).collect();
        let mut record = TournamentRecord::Inactive;
        let mut rng = RandomOrder(StdRng::seed_from_u64(seed));
        start_bracket(&mut record, "Cup", &ids, &mut rng).unwrap();

        let round1 = record.active().and_then(Tournament::bracket).unwrap().get(1).unwrap();
        prop_assert_eq!(round1.len(), size / 2);
        let seen: BTreeSet<ParticipantId> =
            round1.iter().flat_map(|m| [m.player1, m.player2]).collect();
        prop_assert_eq!(seen.len(), size);
    }

    #[test]
    fn champion_and_runner_up_play_the_final(
        seed in any::<u64>(),
        size in prop::sample::select(vec![4usize, 8, 16]),
        picks in prop::collection::vec(any::<bool>(), 15),
    ) {
        let ids: Vec<ParticipantId> = (1..=size as u64).collect();
        let mut record = TournamentRecord::Inactive;
        let mut rng = RandomOrder(StdRng::seed_from_u64(seed));
        start_bracket(&mut record, "Cup", &ids, &mut rng).unwrap();

        let mut picks = picks.into_iter().cycle();
        let (finalists, rankings) = loop {
            let bracket = record.active().and_then(Tournament::bracket).unwrap();
            let (_, matches) = bracket.latest().unwrap();
            let open = matches.iter().find(|m| m.winner.is_none()).unwrap();
            let finalists = [open.player1, open.player2];
            let winner = if picks.next().unwrap_or(true) { open.player1 } else { open.player2 };
            if let SoloProgress::Finished { rankings, .. } =
                declare_winner(&mut record, winner, &mut rng).unwrap()
            {
                break (finalists, rankings);
            }
        };
        prop_assert_ne!(rankings.first, rankings.second);
        prop_assert!(finalists.contains(&rankings.first));
        prop_assert!(finalists.contains(&rankings.second));
        let placed: BTreeSet<ParticipantId> = rankings.all().collect();
        prop_assert_eq!(placed.len(), size);
    }

    #[test]
    fn team_split_is_balanced(seed in any::<u64>(), pool_size in 1usize..40) {
        let mut record = TournamentRecord::Inactive;
        start_registration(&mut record, "War", "A", "B").unwrap();
        for id in 1..=pool_size as u64 {
            join_pool(&mut record, id).unwrap();
        }
        let mut rng = RandomOrder(StdRng::seed_from_u64(seed));
        assign_teams(&mut record, &mut rng).unwrap();

        let state = record.active().and_then(Tournament::team_state).unwrap();
        let (a, b) = (state.team_a.members.len(), state.team_b.members.len());
        prop_assert_eq!(a + b, pool_size);
        prop_assert!(a.abs_diff(b) <= 1);
        prop_assert!(a <= b);
        let matches = state.fight_card.get(1).unwrap_or_default();
        prop_assert_eq!(matches.len(), a.min(b));
        for m in matches {
            prop_assert!(state.team_a.has_member(m.player1));
            prop_assert!(state.team_b.has_member(m.player2));
        }
    }
}
