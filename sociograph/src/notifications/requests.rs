//! Follow-request approval workflow
//!
//! ```text
//! create ──(no approval needed)──> Approved
//!   │
//!   └──(approval needed)──> Pending ──approve──> Approved
//!                              └────────deny───> Denied
//! ```
//!
//! Approved and Denied are terminal.

use super::NotificationEngine;
use crate::governance::PolicyReason;
use crate::models::{
    EntityRef, FollowRequest, InboxEvent, InboxItem, InboxItemKind, NewFollowRequest,
    RelationshipEdge, RequestStatus, RequestTransition,
};
use crate::validation::validate_follow_request;
use crate::{Result, SociographError};
use chrono::Utc;
use tracing::{debug, info, instrument, warn};

impl NotificationEngine {
    /// Request a relationship toward `request.target`.
    ///
    /// A repeated idempotency key returns the original request. If it is
    /// still Pending its approvers are notified again, which is a no-op for
    /// every approver already holding the item. Targets that do not need
    /// approval get the edge immediately and the request is stored as
    /// Approved; otherwise it is stored as Pending and every approver
    /// receives a Request item.
    #[instrument(skip_all, fields(tenant_id = %request.tenant_id, requester = %request.requester, target = %request.target))]
    pub async fn create_follow_request(&self, request: NewFollowRequest) -> Result<FollowRequest> {
        validate_follow_request(&request)?;

        if let Some(existing) = self
            .inbox
            .find_request_by_idempotency_key(
                &request.tenant_id,
                &request.requester,
                &request.target,
                &request.idempotency_key,
            )
            .await?
        {
            debug!(request_id = %existing.id, status = %existing.status, "Returning request for known idempotency key");
            if existing.is_pending() {
                self.notify_approvers(&existing).await?;
            }
            return Ok(existing);
        }

        if !self
            .governance
            .is_targetable(&request.tenant_id, &request.target)
            .await?
        {
            return Err(SociographError::PolicyViolation {
                reason: PolicyReason::NotTargetable,
                message: format!("{} cannot be targeted by relationship requests", request.target),
            });
        }

        let requires_approval = self
            .governance
            .requires_approval_to_follow(
                &request.tenant_id,
                &request.requester,
                &request.target,
                request.requested_kind,
            )
            .await?;

        let now = Utc::now();
        let mut record = FollowRequest {
            id: self.ids.next_id(),
            tenant_id: request.tenant_id,
            requester: request.requester,
            target: request.target,
            requested_kind: request.requested_kind,
            status: RequestStatus::Pending,
            idempotency_key: request.idempotency_key,
            created_at: now,
            decided_at: None,
            decided_by: None,
            decision_note: None,
        };

        if !requires_approval {
            self.create_requested_edge(&record).await?;
            record.status = RequestStatus::Approved;
            record.decided_at = Some(now);

            let stored = self.inbox.insert_request(record).await?;
            info!(request_id = %stored.id, "Follow request approved without review");
            return Ok(stored);
        }

        // A concurrent call with the same key may have stored its record
        // first; either way the stored one is the request.
        let stored = self.inbox.insert_request(record).await?;
        if stored.is_pending() {
            self.notify_approvers(&stored).await?;
        }

        info!(request_id = %stored.id, "Follow request pending approval");
        Ok(stored)
    }

    /// Approve a pending request and create its edge.
    ///
    /// `None` for unknown ids; `InvalidState` when the request was already
    /// decided, including by a concurrent call that got there first.
    #[instrument(skip(self, approver, note), fields(approver = %approver))]
    pub async fn approve_request(
        &self,
        tenant_id: &str,
        request_id: &str,
        approver: &EntityRef,
        note: Option<String>,
    ) -> Result<Option<FollowRequest>> {
        let Some(pending) = self.pending_request(tenant_id, request_id).await? else {
            return Ok(None);
        };

        let Some(approved) = self
            .decide(pending.clone(), RequestStatus::Approved, approver, note)
            .await?
        else {
            return Ok(None);
        };

        // Already Approved here, so a concurrent deny fails. A failed edge
        // write puts the request back to Pending.
        if let Err(err) = self.create_requested_edge(&approved).await {
            warn!(request_id, error = %err, "Edge creation failed, reverting approval");
            if let Err(revert_err) = self
                .inbox
                .transition_request(pending, RequestStatus::Approved)
                .await
            {
                warn!(request_id, error = %revert_err, "Failed to revert approval");
            }
            return Err(err);
        }

        info!(request_id, "Follow request approved");
        Ok(Some(approved))
    }

    /// Deny a pending request. No edge is created.
    #[instrument(skip(self, approver, note), fields(approver = %approver))]
    pub async fn deny_request(
        &self,
        tenant_id: &str,
        request_id: &str,
        approver: &EntityRef,
        note: Option<String>,
    ) -> Result<Option<FollowRequest>> {
        let Some(pending) = self.pending_request(tenant_id, request_id).await? else {
            return Ok(None);
        };

        let denied = self
            .decide(pending, RequestStatus::Denied, approver, note)
            .await?;
        if denied.is_some() {
            info!(request_id, "Follow request denied");
        }
        Ok(denied)
    }

    pub async fn get_request(&self, tenant_id: &str, request_id: &str) -> Result<Option<FollowRequest>> {
        Ok(self.inbox.get_request(tenant_id, request_id).await?)
    }

    /// Pending requests addressed to `target`, oldest first
    pub async fn list_pending_requests(
        &self,
        tenant_id: &str,
        target: &EntityRef,
    ) -> Result<Vec<FollowRequest>> {
        Ok(self
            .inbox
            .list_requests(tenant_id, target, Some(RequestStatus::Pending))
            .await?)
    }

    async fn pending_request(&self, tenant_id: &str, request_id: &str) -> Result<Option<FollowRequest>> {
        let Some(request) = self.inbox.get_request(tenant_id, request_id).await? else {
            debug!(tenant_id, request_id, "Decision on unknown request ignored");
            return Ok(None);
        };

        if !request.is_pending() {
            return Err(already_decided(&request));
        }
        Ok(Some(request))
    }

    /// Move a Pending request to `status` in one store step
    async fn decide(
        &self,
        mut request: FollowRequest,
        status: RequestStatus,
        approver: &EntityRef,
        note: Option<String>,
    ) -> Result<Option<FollowRequest>> {
        request.status = status;
        request.decided_at = Some(Utc::now());
        request.decided_by = Some(approver.clone());
        request.decision_note = note;

        match self
            .inbox
            .transition_request(request, RequestStatus::Pending)
            .await?
        {
            RequestTransition::Applied(decided) => Ok(Some(decided)),
            RequestTransition::Conflict(current) => Err(already_decided(&current)),
            RequestTransition::NotFound => Ok(None),
        }
    }

    async fn create_requested_edge(&self, request: &FollowRequest) -> Result<RelationshipEdge> {
        self.relationships
            .upsert(RelationshipEdge::new(
                request.tenant_id.clone(),
                request.requester.clone(),
                request.target.clone(),
                request.requested_kind,
            ))
            .await
    }

    async fn notify_approvers(&self, request: &FollowRequest) -> Result<()> {
        let approvers = self
            .governance
            .get_approvers(&request.tenant_id, &request.target)
            .await?;
        for approver in approvers {
            self.notify_approver(request, approver).await?;
        }
        Ok(())
    }

    async fn notify_approver(&self, request: &FollowRequest, approver: EntityRef) -> Result<()> {
        let item = InboxItem::new(
            self.ids.next_id(),
            request.tenant_id.clone(),
            approver,
            InboxItemKind::Request,
            InboxEvent::new(self.request_config.notification_type_key.clone(), request.id.clone()),
            format!("request:{}", request.id),
        )
        .with_thread_key(format!("request:{}", request.target.key()));

        self.add(item).await?;
        Ok(())
    }
}

fn already_decided(request: &FollowRequest) -> SociographError {
    SociographError::InvalidState(format!("request {} is already {}", request.id, request.status))
}
