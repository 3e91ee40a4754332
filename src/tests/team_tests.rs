#[cfg(test)]
mod tests {
    use crate::models::{Context, GlobalRole, ServiceError, SubscriptionTier, TeamContext, TeamRole, User};
    use crate::routes::team_routes;
    use crate::services::{authorization, invitation_service, team_service};
    use crate::utils::{identity, invitation_storage, team_storage, user_directory};
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use chrono::Utc;
    use rand::Rng;
    use serde_json::json;
    use uuid::Uuid;

    fn seed_user(tier: SubscriptionTier) -> User {
        let user = User {
            id: Uuid::new_v4().to_string(),
            email: format!("user-{}@example.com", Uuid::new_v4()),
            display_name: None,
            global_role: GlobalRole::Standard,
            subscription_tier: tier,
            created_at: Utc::now(),
        };
        user_directory::save_user(&user).unwrap();
        user
    }

    fn bearer(user: &User) -> String {
        format!("Bearer {}", identity::issue_credential(user).unwrap())
    }

    fn context_for(user: &User) -> Context {
        Context {
            user: user.clone(),
            is_pro_user: user.subscription_tier == SubscriptionTier::Pro,
            is_system_admin: user.global_role == GlobalRole::SystemAdmin,
        }
    }

    // Build a team context the way the resolver would, from current storage
    fn team_context_for(user: &User, team: &crate::models::Team) -> TeamContext {
        let membership = team_storage::find_membership(&team.id, &user.id)
            .unwrap()
            .unwrap();
        TeamContext {
            context: context_for(user),
            team: team.clone(),
            role: membership.role,
        }
    }

    fn unique_slug() -> String {
        format!("team-{}", &Uuid::new_v4().simple().to_string()[..12])
    }

    #[actix_rt::test]
    async fn team_creation_is_gated_on_pro_tier() {
        let app = test::init_service(
            App::new().configure(team_routes::init_routes)
        ).await;

        let user = seed_user(SubscriptionTier::Free);
        let slug = unique_slug();

        let request = test::TestRequest::post()
            .uri("/teams")
            .insert_header(("Authorization", bearer(&user)))
            .set_json(&json!({ "name": "Acme", "slug": slug }))
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);

        // After an upgrade the same request goes through
        user_directory::set_subscription_tier(&user.id, SubscriptionTier::Pro).unwrap();

        let request = test::TestRequest::post()
            .uri("/teams")
            .insert_header(("Authorization", bearer(&user)))
            .set_json(&json!({ "name": "Acme", "slug": slug }))
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[actix_rt::test]
    async fn team_creation_grants_the_creator_admin_atomically() {
        let owner = seed_user(SubscriptionTier::Pro);
        let team = team_service::create_team(&context_for(&owner), "Acme", &unique_slug()).unwrap();

        let members = team_storage::get_team_members(&team.id).unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].user_id, owner.id);
        assert_eq!(members[0].role, TeamRole::Admin);
    }

    #[actix_rt::test]
    async fn team_fields_are_validated() {
        let owner = seed_user(SubscriptionTier::Pro);
        let context = context_for(&owner);

        let err = team_service::create_team(&context, "X", &unique_slug()).unwrap_err();
        assert!(matches!(err, ServiceError::Validation { ref field, .. } if field == "name"));

        let err = team_service::create_team(&context, "Acme", "ab").unwrap_err();
        assert!(matches!(err, ServiceError::Validation { ref field, .. } if field == "slug"));

        let err = team_service::create_team(&context, "Acme", "Not-Lowercase").unwrap_err();
        assert!(matches!(err, ServiceError::Validation { ref field, .. } if field == "slug"));
    }

    #[actix_rt::test]
    async fn slug_collisions_are_reported_distinctly() {
        let owner = seed_user(SubscriptionTier::Pro);
        let other = seed_user(SubscriptionTier::Pro);
        let slug = unique_slug();

        team_service::create_team(&context_for(&owner), "First", &slug).unwrap();
        let err = team_service::create_team(&context_for(&other), "Second", &slug).unwrap_err();
        assert_eq!(err, ServiceError::SlugTaken);
    }

    #[actix_rt::test]
    async fn sole_admin_cannot_demote_or_remove_themselves() {
        let owner = seed_user(SubscriptionTier::Pro);
        let team = team_service::create_team(&context_for(&owner), "Acme", &unique_slug()).unwrap();
        let owner_context = team_context_for(&owner, &team);

        let err = team_service::update_member_role(&owner_context, &owner.id, TeamRole::Member)
            .unwrap_err();
        assert_eq!(err, ServiceError::LastAdminProtected);

        let err = team_service::remove_member(&owner_context, &owner.id).unwrap_err();
        assert_eq!(err, ServiceError::LastAdminProtected);

        // Promote a second admin; the demotion now goes through
        let second = seed_user(SubscriptionTier::Free);
        team_service::add_member(&owner_context, &second.id, TeamRole::Admin).unwrap();

        team_service::update_member_role(&owner_context, &owner.id, TeamRole::Member).unwrap();

        let members = team_storage::get_team_members(&team.id).unwrap();
        assert!(authorization::admin_count(&members) >= 1);
    }

    #[actix_rt::test]
    async fn capacity_follows_the_owners_current_tier() {
        let owner = seed_user(SubscriptionTier::Pro);
        let team = team_service::create_team(&context_for(&owner), "Capped", &unique_slug()).unwrap();
        let owner_context = team_context_for(&owner, &team);

        // Downgrade after creation: the cap applies immediately
        user_directory::set_subscription_tier(&owner.id, SubscriptionTier::Free).unwrap();

        // Fill up to the free-tier limit (the owner already holds one seat)
        for _ in 0..(team_service::FREE_TEAM_MEMBER_LIMIT - 1) {
            let user = seed_user(SubscriptionTier::Free);
            team_service::add_member(&owner_context, &user.id, TeamRole::Member).unwrap();
        }

        let overflow = seed_user(SubscriptionTier::Free);
        let err = team_service::add_member(&owner_context, &overflow.id, TeamRole::Member)
            .unwrap_err();
        assert_eq!(err, ServiceError::CapacityExceeded);

        // Invitations hit the same gate
        let err = invitation_service::create_invitation(
            &owner_context,
            "overflow@example.com",
            TeamRole::Member,
        )
        .unwrap_err();
        assert_eq!(err, ServiceError::CapacityExceeded);

        // Upgrading the owner lifts the cap with no migration step
        user_directory::set_subscription_tier(&owner.id, SubscriptionTier::Pro).unwrap();
        team_service::add_member(&owner_context, &overflow.id, TeamRole::Member).unwrap();
    }

    #[actix_rt::test]
    async fn deleting_a_team_cascades_memberships_and_invitations() {
        let owner = seed_user(SubscriptionTier::Pro);
        let slug = unique_slug();
        let team = team_service::create_team(&context_for(&owner), "Doomed", &slug).unwrap();
        let owner_context = team_context_for(&owner, &team);

        invitation_service::create_invitation(
            &owner_context,
            "invitee@example.com",
            TeamRole::Member,
        )
        .unwrap();

        team_service::delete_team(&owner_context).unwrap();

        assert!(team_storage::find_team_by_slug(&slug).unwrap().is_none());
        assert!(team_storage::get_team_members(&team.id).unwrap().is_empty());
        assert!(invitation_storage::get_invitations_for_team(&team.id).unwrap().is_empty());
    }

    #[actix_rt::test]
    async fn admin_count_never_reaches_zero_under_random_mutations() {
        let owner = seed_user(SubscriptionTier::Pro);
        let team = team_service::create_team(&context_for(&owner), "Fuzzed", &unique_slug()).unwrap();

        let pool: Vec<User> = (0..5).map(|_| seed_user(SubscriptionTier::Free)).collect();
        let mut rng = rand::thread_rng();

        for _ in 0..200 {
            let members = team_storage::get_team_members(&team.id).unwrap();

            // Act as whichever admin currently exists
            let admin = members.iter().find(|m| m.role == TeamRole::Admin).unwrap();
            let admin_user = user_directory::find_user_by_id(&admin.user_id).unwrap().unwrap();
            let admin_context = team_context_for(&admin_user, &team);

            match rng.gen_range(0..3) {
                0 => {
                    let target = &pool[rng.gen_range(0..pool.len())];
                    let role = if rng.gen_bool(0.5) { TeamRole::Admin } else { TeamRole::Member };
                    let _ = team_service::add_member(&admin_context, &target.id, role);
                }
                1 => {
                    let target_id = members[rng.gen_range(0..members.len())].user_id.clone();
                    let _ = team_service::remove_member(&admin_context, &target_id);
                }
                _ => {
                    let target_id = members[rng.gen_range(0..members.len())].user_id.clone();
                    let role = if rng.gen_bool(0.5) { TeamRole::Admin } else { TeamRole::Member };
                    let _ = team_service::update_member_role(&admin_context, &target_id, role);
                }
            }

            let after = team_storage::get_team_members(&team.id).unwrap();
            assert!(
                authorization::admin_count(&after) >= 1,
                "admin count must never reach zero"
            );
        }
    }

    #[actix_rt::test]
    async fn concurrent_demotions_cannot_strip_both_admins() {
        let owner = seed_user(SubscriptionTier::Pro);
        let team = team_service::create_team(&context_for(&owner), "Raced", &unique_slug()).unwrap();
        let owner_context = team_context_for(&owner, &team);

        let second = seed_user(SubscriptionTier::Free);
        team_service::add_member(&owner_context, &second.id, TeamRole::Admin).unwrap();

        // Each admin demotes the other at the same time
        let first_handle = {
            let team_context = team_context_for(&owner, &team);
            let target = second.id.clone();
            std::thread::spawn(move || {
                team_service::update_member_role(&team_context, &target, TeamRole::Member)
            })
        };
        let second_handle = {
            let team_context = team_context_for(&second, &team);
            let target = owner.id.clone();
            std::thread::spawn(move || {
                team_service::update_member_role(&team_context, &target, TeamRole::Member)
            })
        };

        let results = vec![first_handle.join().unwrap(), second_handle.join().unwrap()];
        let succeeded = results.iter().filter(|result| result.is_ok()).count();
        assert_eq!(succeeded, 1, "exactly one concurrent demotion may win");

        let members = team_storage::get_team_members(&team.id).unwrap();
        assert!(authorization::admin_count(&members) >= 1);
    }
}
