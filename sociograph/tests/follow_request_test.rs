//! Follow-request workflow against a mocked governance policy

use async_trait::async_trait;
use mockall::mock;
use mockall::predicate::eq;
use sociograph::models::EdgeKey;
use sociograph::prelude::*;
use std::sync::Arc;

const TENANT: &str = "acme";

mock! {
    pub Policy {}

    #[async_trait]
    impl GovernancePolicy for Policy {
        async fn is_targetable(&self, tenant_id: &str, entity: &EntityRef) -> sociograph::Result<bool>;

        async fn requires_approval_to_follow(
            &self,
            tenant_id: &str,
            requester: &EntityRef,
            target: &EntityRef,
            kind: RelationshipKind,
        ) -> sociograph::Result<bool>;

        async fn get_approvers(&self, tenant_id: &str, target: &EntityRef) -> sociograph::Result<Vec<EntityRef>>;
    }
}

impl std::fmt::Debug for MockPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockPolicy").finish()
    }
}

fn graph_with(policy: MockPolicy) -> Sociograph {
    Sociograph::builder()
        .with_config(ConfigBuilder::testing().build().unwrap())
        .with_governance(Arc::new(policy))
        .build()
        .expect("Failed to build")
}

fn follow_key(requester: &EntityRef, target: &EntityRef) -> EdgeKey {
    RelationshipEdge::follow(TENANT, requester.clone(), target.clone()).key()
}

#[tokio::test]
async fn test_request_without_approval_creates_edge_immediately() {
    let mut policy = MockPolicy::new();
    policy.expect_is_targetable().returning(|_, _| Ok(true));
    policy
        .expect_requires_approval_to_follow()
        .times(1)
        .returning(|_, _, _, _| Ok(false));
    policy.expect_get_approvers().never();

    let graph = graph_with(policy);
    let requester = EntityRef::user("r");
    let target = EntityRef::user("public");

    let request = graph
        .notifications()
        .create_follow_request(NewFollowRequest::follow(TENANT, requester.clone(), target.clone(), "k1"))
        .await
        .unwrap();

    assert_eq!(request.status, RequestStatus::Approved);
    assert!(request.decided_at.is_some());

    let edge = graph
        .relationships()
        .find_edge(&follow_key(&requester, &target))
        .await
        .unwrap()
        .expect("edge created");
    assert!(edge.is_active);

    let followers = graph
        .relationships()
        .get_followers(TENANT, &target, RelationshipKind::Follow)
        .await
        .unwrap();
    assert_eq!(followers, vec![requester]);
}

#[tokio::test]
async fn test_request_with_approval_notifies_each_approver_once() {
    let target = EntityRef::user("private");
    let moderator = EntityRef::user("moderator");
    let approvers = vec![target.clone(), moderator.clone()];

    let mut policy = MockPolicy::new();
    policy.expect_is_targetable().returning(|_, _| Ok(true));
    policy
        .expect_requires_approval_to_follow()
        .returning(|_, _, _, _| Ok(true));
    policy
        .expect_get_approvers()
        .with(eq(TENANT), eq(target.clone()))
        .times(2)
        .returning(move |_, _| Ok(approvers.clone()));

    let graph = graph_with(policy);
    let requester = EntityRef::user("r");
    let notifications = graph.notifications();

    let request = notifications
        .create_follow_request(NewFollowRequest::follow(TENANT, requester.clone(), target.clone(), "k1"))
        .await
        .unwrap();
    assert_eq!(request.status, RequestStatus::Pending);
    assert!(
        graph
            .relationships()
            .find_edge(&follow_key(&requester, &target))
            .await
            .unwrap()
            .is_none()
    );

    for approver in [&target, &moderator] {
        let page = notifications
            .query_inbox(InboxQuery::new(TENANT, approver.clone()).kind(InboxItemKind::Request))
            .await
            .unwrap();
        assert_eq!(page.items.len(), 1, "{} should hold one request item", approver);
        assert_eq!(page.items[0].event.id, request.id);
    }

    // Retrying with the same key re-sends to the approvers, who still hold one item each
    let replay = notifications
        .create_follow_request(NewFollowRequest::follow(TENANT, requester.clone(), target.clone(), "k1"))
        .await
        .unwrap();
    assert_eq!(replay.id, request.id);
    assert_eq!(notifications.list_pending_requests(TENANT, &target).await.unwrap().len(), 1);
    for approver in [&target, &moderator] {
        assert_eq!(notifications.count_unread(TENANT, approver).await.unwrap(), 1);
    }

    let approved = notifications
        .approve_request(TENANT, &request.id, &moderator, None)
        .await
        .unwrap()
        .expect("request exists");
    assert_eq!(approved.status, RequestStatus::Approved);
    assert_eq!(approved.decided_by, Some(moderator.clone()));
    assert!(approved.decided_at.is_some());

    let edges = graph
        .relationships()
        .query(EdgeQuery::new(TENANT).from(requester.clone()).to(target.clone()))
        .await
        .unwrap();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].kind, RelationshipKind::Follow);

    let stored = notifications.get_request(TENANT, &request.id).await.unwrap().unwrap();
    assert_eq!(stored, approved);
}

#[tokio::test]
async fn test_denied_request_creates_no_edge() {
    let mut policy = MockPolicy::new();
    policy.expect_is_targetable().returning(|_, _| Ok(true));
    policy
        .expect_requires_approval_to_follow()
        .returning(|_, _, _, _| Ok(true));
    policy
        .expect_get_approvers()
        .returning(|_, target| Ok(vec![target.clone()]));

    let graph = graph_with(policy);
    let requester = EntityRef::user("r");
    let target = EntityRef::user("private");

    let request = graph
        .notifications()
        .create_follow_request(NewFollowRequest::follow(TENANT, requester.clone(), target.clone(), "k1"))
        .await
        .unwrap();
    let denied = graph
        .notifications()
        .deny_request(TENANT, &request.id, &target, Some("no thanks".to_string()))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(denied.status, RequestStatus::Denied);
    assert_eq!(denied.decided_by, Some(target.clone()));
    assert!(
        graph
            .relationships()
            .query(EdgeQuery::new(TENANT).from(requester))
            .await
            .unwrap()
            .is_empty()
    );

    let err = graph
        .notifications()
        .deny_request(TENANT, &request.id, &target, None)
        .await
        .unwrap_err();
    assert!(matches!(err, SociographError::InvalidState(_)));
}

#[tokio::test]
async fn test_non_targetable_entity_is_rejected() {
    let mut policy = MockPolicy::new();
    policy.expect_is_targetable().times(1).returning(|_, _| Ok(false));
    policy.expect_requires_approval_to_follow().never();
    policy.expect_get_approvers().never();

    let graph = graph_with(policy);
    let requester = EntityRef::user("r");
    let target = EntityRef::service("system");

    let err = graph
        .notifications()
        .create_follow_request(NewFollowRequest::follow(TENANT, requester.clone(), target.clone(), "k1"))
        .await
        .unwrap_err();

    assert_eq!(err.policy_reason(), Some(&PolicyReason::NotTargetable));
    assert_eq!(err.policy_reason().map(PolicyReason::as_code), Some("NOT_TARGETABLE"));
    assert!(
        graph
            .notifications()
            .list_pending_requests(TENANT, &target)
            .await
            .unwrap()
            .is_empty()
    );
    assert!(
        graph
            .relationships()
            .find_edge(&follow_key(&requester, &target))
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_invalid_request_reports_every_field() {
    let mut policy = MockPolicy::new();
    policy.expect_is_targetable().never();

    let graph = graph_with(policy);
    let request = NewFollowRequest::follow("", EntityRef::new("", "", ""), EntityRef::new("", "", ""), "");

    match graph.notifications().create_follow_request(request).await {
        Err(SociographError::Validation(errors)) => {
            assert_eq!(
                errors.fields(),
                vec!["tenant_id", "requester", "target", "idempotency_key"]
            );
        }
        other => panic!("expected validation error, got {:?}", other),
    }
}
