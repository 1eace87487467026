mod selection;
