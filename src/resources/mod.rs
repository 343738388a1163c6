//! Resources Module
//!
//! Typed wrappers over individual commands. Each method builds a
//! [`Command`], executes it through the [`Client`] and maps the records
//! onto one of the shapes declared in the submodules.

mod channel;
mod clients;
mod group;
mod server;
mod session;

use crate::client::Client;
use crate::error::Result;
use crate::protocol::{ArgValue, Command};

pub use channel::Channel;
pub use clients::{ClientListFlag, DbClient, OnlineClient};
pub use group::{Group, PrivilegeKey};
pub use server::{CreatedServer, Instance, Server, ServerConnectionInfo, Snapshot};
pub use session::{Version, WhoAmI};

use group::Token;
use server::ServerId;

/// Virtual server and instance commands, from [`Client::server`]
pub struct ServerMethods<'a> {
    client: &'a Client,
}

impl<'a> ServerMethods<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    // =========================================================================
    // Virtual servers
    // =========================================================================

    /// All virtual servers on the instance
    pub fn list(&self) -> Result<Vec<Server>> {
        self.client.exec_into(&Command::new("serverlist"))
    }

    /// Id of the virtual server listening on `port`
    pub fn id_get_by_port(&self, port: u16) -> Result<u32> {
        let found: ServerId = self
            .client
            .exec_one(&Command::new("serveridgetbyport").option("virtualserver_port", port))?;
        Ok(found.server_id)
    }

    /// Settings of the selected virtual server
    pub fn info(&self) -> Result<Server> {
        self.client.exec_one(&Command::new("serverinfo"))
    }

    /// Create a virtual server named `name`
    pub fn create(&self, name: &str) -> Result<CreatedServer> {
        self.client
            .exec_one(&Command::new("servercreate").option("virtualserver_name", name))
    }

    /// Change properties of the selected virtual server.
    ///
    /// ```no_run
    /// # fn demo(client: &ts3query::Client) -> ts3query::Result<()> {
    /// client.server().edit([("virtualserver_maxclients", 10)])?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn edit<I, K, V>(&self, properties: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ArgValue,
    {
        let command = properties
            .into_iter()
            .fold(Command::new("serveredit"), |cmd, (key, value)| cmd.option(key, value));
        self.client.exec(&command)?;
        Ok(())
    }

    pub fn delete(&self, id: u32) -> Result<()> {
        self.client.exec(&Command::new("serverdelete").option("sid", id))?;
        Ok(())
    }

    pub fn start(&self, id: u32) -> Result<()> {
        self.client.exec(&Command::new("serverstart").option("sid", id))?;
        Ok(())
    }

    pub fn stop(&self, id: u32) -> Result<()> {
        self.client.exec(&Command::new("serverstop").option("sid", id))?;
        Ok(())
    }

    /// Traffic counters of the whole instance
    pub fn connection_info(&self) -> Result<ServerConnectionInfo> {
        self.client
            .exec_one(&Command::new("serverrequestconnectioninfo"))
    }

    pub fn instance_info(&self) -> Result<Instance> {
        self.client.exec_one(&Command::new("instanceinfo"))
    }

    /// Snapshot of the selected virtual server; empty `password` sends none
    pub fn snapshot_create(&self, password: &str) -> Result<Snapshot> {
        let password = (!password.is_empty()).then_some(password);
        self.client.exec_one(
            &Command::new("serversnapshotcreate").option_opt("password", password),
        )
    }

    // =========================================================================
    // Groups & privilege keys
    // =========================================================================

    pub fn group_list(&self) -> Result<Vec<Group>> {
        self.client.exec_into(&Command::new("servergrouplist"))
    }

    pub fn privilege_key_list(&self) -> Result<Vec<PrivilegeKey>> {
        self.client.exec_into(&Command::new("privilegekeylist"))
    }

    /// Create a privilege key and return its token.
    ///
    /// `token_type` 0 grants server group `id1`; 1 grants channel group
    /// `id1` in channel `id2`.
    pub fn privilege_key_add(&self, token_type: u8, id1: u32, id2: u32) -> Result<String> {
        let command = Command::new("privilegekeyadd")
            .option("tokentype", token_type)
            .option("tokenid1", id1)
            .option("tokenid2", id2);
        let created: Token = self.client.exec_one(&command)?;
        Ok(created.token)
    }

    // =========================================================================
    // Channels & clients
    // =========================================================================

    pub fn channel_list(&self) -> Result<Vec<Channel>> {
        self.client.exec_into(&Command::new("channellist"))
    }

    /// Connected clients, with the extra field groups selected by `flags`
    pub fn client_list(&self, flags: &[ClientListFlag]) -> Result<Vec<OnlineClient>> {
        let command = flags
            .iter()
            .fold(Command::new("clientlist"), |cmd, flag| cmd.flag(flag.as_str()));
        self.client.exec_into(&command)
    }

    /// Clients known to the server database
    pub fn client_db_list(&self) -> Result<Vec<DbClient>> {
        self.client.exec_into(&Command::new("clientdblist"))
    }
}
