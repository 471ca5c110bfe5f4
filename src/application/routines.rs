pub mod list_integrations_routine;
pub mod update_list_ids_routine;
