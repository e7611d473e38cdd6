//! Organization membership and invitations.
//!
//! The invitation endpoints take form-encoded bodies rather than JSON.

use crate::request::{encode_segment, Body, Request};
use crate::resources::users::UserRepresentation;
use crate::{Dispatch, Result};

pub struct Organizations<'a, D> {
    dispatch: &'a D,
}

impl<'a, D: Dispatch> Organizations<'a, D> {
    pub(crate) fn new(dispatch: &'a D) -> Self {
        Self { dispatch }
    }

    /// Add an existing user as a member.
    pub async fn add_member(&self, org_id: &str, user_id: &str) -> Result<()> {
        // the endpoint expects the bare id as a JSON string
        self.dispatch
            .execute(Request::post(members_path(org_id)).json(user_id)?)
            .await
    }

    pub async fn list_members(
        &self,
        org_id: &str,
        first: Option<u32>,
        max: Option<u32>,
    ) -> Result<Vec<UserRepresentation>> {
        self.dispatch
            .fetch(
                Request::get(members_path(org_id))
                    .query_opt("first", first)
                    .query_opt("max", max),
            )
            .await
    }

    /// Send an invitation email to a user that already exists in the realm.
    pub async fn invite_existing_user(&self, org_id: &str, user_id: &str) -> Result<()> {
        let request = Request::post(format!("{}/invite-existing-user", members_path(org_id)))
            .body(Body::form([("id", user_id)]));
        self.dispatch.execute(request).await
    }

    /// Send a registration invitation to an email address.
    pub async fn invite_user(
        &self,
        org_id: &str,
        email: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> Result<()> {
        let fields = [
            ("email", Some(email)),
            ("firstName", first_name),
            ("lastName", last_name),
        ];
        let body = Body::form(
            fields
                .into_iter()
                .filter_map(|(key, value)| value.map(|value| (key, value))),
        );
        let request =
            Request::post(format!("{}/invite-user", members_path(org_id))).body(body);
        self.dispatch.execute(request).await
    }
}

fn members_path(org_id: &str) -> String {
    format!("/organizations/{}/members", encode_segment(org_id))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::request::FORM_CONTENT_TYPE;
    use crate::resources::Resources;
    use crate::resources::recorder::{Canned, Recorder};

    #[tokio::test]
    async fn invite_user_sends_form_and_skips_absent_names() {
        let recorder = Recorder::new([Canned::Empty]);

        recorder
            .organizations()
            .invite_user("org-1", "ann@example.com", Some("Ann"), None)
            .await
            .unwrap();

        let request = recorder.only_request();
        assert_eq!(request.path, "/organizations/org-1/members/invite-user");
        assert_eq!(request.content_type(), FORM_CONTENT_TYPE);
        assert_eq!(
            request.body.unwrap().to_bytes(),
            b"email=ann%40example.com&firstName=Ann".to_vec()
        );
    }

    #[tokio::test]
    async fn invite_existing_user_sends_id_field() {
        let recorder = Recorder::new([Canned::Empty]);

        recorder
            .organizations()
            .invite_existing_user("org-1", "u-9")
            .await
            .unwrap();

        let body = recorder.only_request().body.unwrap();
        assert_eq!(body.content_type(), FORM_CONTENT_TYPE);
        assert_eq!(body.to_bytes(), b"id=u-9".to_vec());
    }

    #[tokio::test]
    async fn add_member_sends_json_string() {
        let recorder = Recorder::new([Canned::Created("u-9")]);
        recorder.organizations().add_member("org-1", "u-9").await.unwrap();
        assert_eq!(
            recorder.only_request().body,
            Some(Body::Json(json!("u-9")))
        );
    }
}
